//! ivd-records
//!
//! Record layout contract for delimited invoice batches.
//!
//! A batch is an ordered sequence of text lines: the fixed [`HEADER_LINE`]
//! followed by zero or more invoice lines. Each invoice line is
//! comma-separated into exactly [`FIELD_COUNT`] positional fields, with
//! **no quoting or escaping** (a value containing a comma shifts everything
//! after it; that is the producer's problem, not ours).
//!
//! ## Field layout
//!
//! | Index | Accessor          | Example      | Notes                         |
//! |-------|-------------------|--------------|-------------------------------|
//! | 0     | `invoice_id`      | `1`          | Duplicate-removal key         |
//! | 1     | `invoice_date`    | `02/05/2021` | Opaque text, never parsed     |
//! | 2     | `gross_amount`    | `1000`       | Integer-parsed on demand      |
//! | 3     | `net_amount`      | `810`        | Integer-parsed on demand      |
//! | 4     | `iva_tax`         | `19`         | Mutually exclusive with IGIC  |
//! | 5     | `igic_tax`        | `7`          | Mutually exclusive with IVA   |
//! | 6     | `concept`         | `ACME roller`| Opaque text                   |
//! | 7     | `cif`             | `B76430134`  | Mutually exclusive with NIF   |
//! | 8     | `nif`             | `12345678Z`  | Mutually exclusive with CIF   |
//!
//! This crate is pure layout plus parsing helpers. Business rules live in
//! `ivd-filter`, and there is no I/O anywhere: callers hand in lines that
//! were already split on line breaks.

/// The exact header line every batch must start with.
///
/// Comparison elsewhere is byte-exact, including the single space after each
/// comma.
pub const HEADER_LINE: &str =
    "Num_factura, Fecha, Bruto, Neto, IVA, IGIC, Concepto, CIF_cliente, NIF_cliente";

/// Number of positional fields in a well-formed invoice line.
pub const FIELD_COUNT: usize = 9;

/// Positional field indices into a comma-split invoice line.
pub mod field {
    pub const INVOICE_ID: usize = 0;
    pub const INVOICE_DATE: usize = 1;
    pub const GROSS_AMOUNT: usize = 2;
    pub const NET_AMOUNT: usize = 3;
    pub const IVA_TAX: usize = 4;
    pub const IGIC_TAX: usize = 5;
    pub const CONCEPT: usize = 6;
    pub const CIF: usize = 7;
    pub const NIF: usize = 8;
}

// ---------------------------------------------------------------------------
// Record view
// ---------------------------------------------------------------------------

/// Borrowed field view over one comma-split invoice line.
///
/// Never allocates field storage beyond the index vector and never fails:
/// a line with fewer than [`FIELD_COUNT`] fields simply reads the missing
/// positions as `""`. A field is *empty* iff its string is zero-length; no
/// trimming is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRecord<'a> {
    fields: Vec<&'a str>,
}

impl<'a> InvoiceRecord<'a> {
    /// Split `line` on `,` into a field view. Infallible.
    pub fn parse(line: &'a str) -> Self {
        Self {
            fields: line.split(',').collect(),
        }
    }

    /// Raw field at `index`, or `""` when the line is too short.
    pub fn field(&self, index: usize) -> &'a str {
        self.fields.get(index).copied().unwrap_or("")
    }

    pub fn invoice_id(&self) -> &'a str {
        self.field(field::INVOICE_ID)
    }

    pub fn invoice_date(&self) -> &'a str {
        self.field(field::INVOICE_DATE)
    }

    pub fn gross_amount(&self) -> &'a str {
        self.field(field::GROSS_AMOUNT)
    }

    pub fn net_amount(&self) -> &'a str {
        self.field(field::NET_AMOUNT)
    }

    pub fn iva_tax(&self) -> &'a str {
        self.field(field::IVA_TAX)
    }

    pub fn igic_tax(&self) -> &'a str {
        self.field(field::IGIC_TAX)
    }

    pub fn concept(&self) -> &'a str {
        self.field(field::CONCEPT)
    }

    pub fn cif(&self) -> &'a str {
        self.field(field::CIF)
    }

    pub fn nif(&self) -> &'a str {
        self.field(field::NIF)
    }

    /// Number of fields the line actually split into (may differ from
    /// [`FIELD_COUNT`]).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Loose numeric parsing
// ---------------------------------------------------------------------------

/// Truncating radix-10 integer parse with loose numeric-prefix semantics.
///
/// Rules:
/// - Leading ASCII whitespace is skipped.
/// - One optional `+` or `-` sign is accepted.
/// - The longest leading run of ASCII digits is parsed; everything after it
///   is ignored (`"19.5"` → `Some(19)`).
/// - `None` is the not-a-number sentinel: no digits at all (`""`, `"abc"`,
///   `"-"`), or a digit run that does not fit `i64`. The sentinel compares
///   equal to no numeric value, so amount checks built on it can never pass.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();

    let (negative, rest) = if let Some(r) = s.strip_prefix('-') {
        (true, r)
    } else if let Some(r) = s.strip_prefix('+') {
        (false, r)
    } else {
        (false, s)
    };

    let digits_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_len == 0 {
        return None;
    }

    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
