//! Per-line business checks.
//!
//! Each check is a pure predicate over one [`InvoiceRecord`];
//! [`evaluate_line`] combines them into a decision/reason pair. Checks never
//! look at other lines — duplicate-id handling is the pipeline's job (see
//! `filter`).

use once_cell::sync::Lazy;
use regex::Regex;

use ivd_records::{parse_int_prefix, InvoiceRecord};

/// Unanchored on purpose: the upstream rule matches a decimal token
/// *anywhere* in the field, so `"abc19xyz"` counts as carrying a decimal.
/// Anchoring to `^\d+(\.\d+)?$` would reject lines the system accepts today;
/// do not tighten without re-validating the business rule.
static DECIMAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?").expect("decimal token pattern compiles"));

// ---------------------------------------------------------------------------
// Decision types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineReason {
    Accepted,
    /// Tax fields are not one-of-IVA/IGIC with a decimal value.
    TaxFieldsInvalid,
    /// CIF/NIF are both filled or both empty.
    IdentificationFieldsInvalid,
    /// Net amount does not equal gross minus the IVA percentage.
    NetAmountMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDecision {
    pub action: LineAction,
    pub reason: LineReason,
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// At least one of IVA/IGIC carries a decimal token, and at most one of the
/// two fields is populated. Both-empty fails (no token anywhere); both-filled
/// fails (not mutually exclusive).
pub fn check_tax_fields(record: &InvoiceRecord<'_>) -> bool {
    let iva = record.iva_tax();
    let igic = record.igic_tax();

    let has_decimal_token = DECIMAL_TOKEN.is_match(iva) || DECIMAL_TOKEN.is_match(igic);
    let at_most_one_populated = iva.is_empty() || igic.is_empty();

    has_decimal_token && at_most_one_populated
}

/// Exactly one of CIF/NIF is populated.
pub fn check_identification_fields(record: &InvoiceRecord<'_>) -> bool {
    record.cif().is_empty() != record.nif().is_empty()
}

/// `net == gross - gross * (iva / 100)`, computed in `f64` from the
/// integer-prefix parses and compared exactly.
///
/// Always reads the IVA field, never IGIC. An IGIC-taxed line has an empty
/// IVA field, which parses to the not-a-number sentinel, so the check fails
/// for it. That coupling has held across every revision of the upstream rule
/// set; do not substitute the IGIC field without re-validating the rule.
#[allow(clippy::float_cmp)] // exact equality IS the rule
pub fn check_net_amount(record: &InvoiceRecord<'_>) -> bool {
    let gross = parse_int_prefix(record.gross_amount());
    let net = parse_int_prefix(record.net_amount());
    let iva = parse_int_prefix(record.iva_tax());

    match (gross, net, iva) {
        (Some(gross), Some(net), Some(iva)) => {
            let expected = gross as f64 - gross as f64 * (iva as f64 / 100.0);
            net as f64 == expected
        }
        _ => false,
    }
}

/// Run all three checks in order; the first failure names the reason.
pub fn evaluate_line(record: &InvoiceRecord<'_>) -> LineDecision {
    if !check_tax_fields(record) {
        return LineDecision {
            action: LineAction::Reject,
            reason: LineReason::TaxFieldsInvalid,
        };
    }
    if !check_identification_fields(record) {
        return LineDecision {
            action: LineAction::Reject,
            reason: LineReason::IdentificationFieldsInvalid,
        };
    }
    if !check_net_amount(record) {
        return LineDecision {
            action: LineAction::Reject,
            reason: LineReason::NetAmountMismatch,
        };
    }
    LineDecision {
        action: LineAction::Accept,
        reason: LineReason::Accepted,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a record line from the fields the checks care about.
    fn line(gross: &str, net: &str, iva: &str, igic: &str, cif: &str, nif: &str) -> String {
        format!("1,02/05/2021,{gross},{net},{iva},{igic},ACME roller,{cif},{nif}")
    }

    fn rec(line: &str) -> InvoiceRecord<'_> {
        InvoiceRecord::parse(line)
    }

    // --- check_tax_fields ---

    #[test]
    fn iva_only_with_decimal_passes() {
        let l = line("1000", "810", "19", "", "B76430134", "");
        assert!(check_tax_fields(&rec(&l)));
    }

    #[test]
    fn igic_only_with_decimal_passes() {
        let l = line("1000", "930", "", "7", "B76430134", "");
        assert!(check_tax_fields(&rec(&l)));
    }

    #[test]
    fn fractional_tax_value_passes() {
        let l = line("1000", "805", "19.5", "", "B76430134", "");
        assert!(check_tax_fields(&rec(&l)));
    }

    #[test]
    fn both_tax_fields_filled_fails() {
        let l = line("1000", "810", "19", "7", "B76430134", "");
        assert!(!check_tax_fields(&rec(&l)));
    }

    #[test]
    fn both_tax_fields_empty_fails() {
        let l = line("1000", "810", "", "", "B76430134", "");
        assert!(!check_tax_fields(&rec(&l)));
    }

    #[test]
    fn non_decimal_tax_text_fails() {
        let l = line("1000", "810", "nineteen", "", "B76430134", "");
        assert!(!check_tax_fields(&rec(&l)));
    }

    /// The pattern is deliberately unanchored: a digit run embedded in text
    /// still counts as a decimal token.
    #[test]
    fn tax_token_match_is_unanchored() {
        let l = line("1000", "810", "abc19xyz", "", "B76430134", "");
        assert!(check_tax_fields(&rec(&l)));
    }

    #[test]
    fn missing_tax_fields_on_short_line_fail() {
        // Two fields only; IVA/IGIC read as empty.
        assert!(!check_tax_fields(&rec("1,02/05/2021")));
    }

    // --- check_identification_fields ---

    #[test]
    fn cif_only_passes() {
        let l = line("1000", "810", "19", "", "B76430134", "");
        assert!(check_identification_fields(&rec(&l)));
    }

    #[test]
    fn nif_only_passes() {
        let l = line("1000", "810", "19", "", "", "12345678Z");
        assert!(check_identification_fields(&rec(&l)));
    }

    #[test]
    fn both_identifiers_filled_fails() {
        let l = line("1000", "810", "19", "", "B76430134", "12345678Z");
        assert!(!check_identification_fields(&rec(&l)));
    }

    #[test]
    fn both_identifiers_empty_fails() {
        let l = line("1000", "810", "19", "", "", "");
        assert!(!check_identification_fields(&rec(&l)));
    }

    // --- check_net_amount ---

    #[test]
    fn exact_net_amount_passes() {
        // 810 = 1000 - 1000 * 0.19
        let l = line("1000", "810", "19", "", "B76430134", "");
        assert!(check_net_amount(&rec(&l)));
    }

    #[test]
    fn zero_iva_means_net_equals_gross() {
        let l = line("1000", "1000", "0", "", "B76430134", "");
        assert!(check_net_amount(&rec(&l)));
    }

    #[test]
    fn mismatched_net_amount_fails() {
        let l = line("1000", "9", "19", "", "B76430134", "");
        assert!(!check_net_amount(&rec(&l)));
    }

    #[test]
    fn fractional_expected_amount_never_matches_integer_net() {
        // 10 - 10 * 0.15 = 8.5; an integer net amount cannot equal it.
        let l = line("10", "8", "15", "", "B76430134", "");
        assert!(!check_net_amount(&rec(&l)));
    }

    #[test]
    fn tax_value_is_integer_truncated_before_the_formula() {
        // "19.5" parses to 19, so 810 still matches.
        let l = line("1000", "810", "19.5", "", "B76430134", "");
        assert!(check_net_amount(&rec(&l)));
    }

    #[test]
    fn non_numeric_amount_fails() {
        let l = line("lots", "810", "19", "", "B76430134", "");
        assert!(!check_net_amount(&rec(&l)));
    }

    /// The check reads IVA even when IGIC is the populated tax field, so an
    /// IGIC-only line can never pass it.
    #[test]
    fn igic_only_line_always_fails_net_amount() {
        // 930 = 1000 - 1000 * 0.07 would hold if the formula read IGIC.
        let l = line("1000", "930", "", "7", "B76430134", "");
        assert!(!check_net_amount(&rec(&l)));
    }

    // --- evaluate_line ---

    #[test]
    fn valid_line_is_accepted() {
        let l = line("1000", "810", "19", "", "B76430134", "");
        let d = evaluate_line(&rec(&l));
        assert_eq!(d.action, LineAction::Accept);
        assert_eq!(d.reason, LineReason::Accepted);
    }

    #[test]
    fn first_failing_check_names_the_reason() {
        // Both tax fields filled AND both identifiers filled: tax wins.
        let l = line("1000", "810", "19", "7", "B76430134", "12345678Z");
        let d = evaluate_line(&rec(&l));
        assert_eq!(d.action, LineAction::Reject);
        assert_eq!(d.reason, LineReason::TaxFieldsInvalid);
    }

    #[test]
    fn identification_reason_reported_when_tax_is_fine() {
        let l = line("1000", "810", "19", "", "", "");
        let d = evaluate_line(&rec(&l));
        assert_eq!(d.reason, LineReason::IdentificationFieldsInvalid);
    }

    #[test]
    fn net_amount_reason_reported_when_field_rules_pass() {
        let l = line("1000", "9", "19", "", "B76430134", "");
        let d = evaluate_line(&rec(&l));
        assert_eq!(d.reason, LineReason::NetAmountMismatch);
    }
}
