//! The batch pipeline: header precondition → per-line checks → duplicate-id
//! group removal → verbatim result assembly.
//!
//! Structural problems (no lines, wrong header) are the only `Err`; a line
//! violating a business rule is silently excluded and the caller gets a
//! shorter, valid batch.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use ivd_records::{InvoiceRecord, HEADER_LINE};

use crate::report::{DuplicateIdGroup, FilterReport};
use crate::rules::{evaluate_line, LineAction, LineReason};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// The batch is structurally unusable: no lines at all, or the first line is
/// not the exact header literal.
///
/// One error kind only; the offending first line is carried for the message,
/// not for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFileError {
    first_line: Option<String>,
}

impl InvalidFileError {
    fn new(lines: &[String]) -> Self {
        Self {
            first_line: lines.first().cloned(),
        }
    }

    /// The first input line, when there was one.
    pub fn first_line(&self) -> Option<&str> {
        self.first_line.as_deref()
    }
}

impl fmt::Display for InvalidFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.first_line {
            Some(line) => write!(
                f,
                "invalid invoice file: first line {line:?} is not the expected header"
            ),
            None => write!(f, "invalid invoice file: no lines"),
        }
    }
}

impl std::error::Error for InvalidFileError {}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Filter an invoice batch, also returning the [`FilterReport`] describing
/// what was dropped and why.
///
/// Contract:
/// - `lines[0]` must equal [`HEADER_LINE`] byte-exact or the whole batch is
///   rejected with [`InvalidFileError`], before any per-line work.
/// - A header-only batch is returned unchanged.
/// - Every other line is judged independently by the rule checks; survivors
///   whose invoice id is shared with another survivor are then dropped as a
///   whole group. Lines that failed the checks never enter that grouping.
/// - Output is the original header string followed by the surviving lines,
///   verbatim and in input order.
pub fn apply_with_report(
    lines: &[String],
) -> Result<(Vec<String>, FilterReport), InvalidFileError> {
    if lines.first().map(String::as_str) != Some(HEADER_LINE) {
        return Err(InvalidFileError::new(lines));
    }

    let invoice_lines = &lines[1..];
    let total_lines = invoice_lines.len();

    // --- Stage one: independent per-line rule evaluation ---
    let mut survivors: Vec<&String> = Vec::new();
    let mut rejected_tax_fields = 0;
    let mut rejected_identification = 0;
    let mut rejected_net_amount = 0;

    for (offset, line) in invoice_lines.iter().enumerate() {
        let record = InvoiceRecord::parse(line);
        let decision = evaluate_line(&record);
        match decision.action {
            LineAction::Accept => survivors.push(line),
            LineAction::Reject => {
                debug!(
                    line_no = offset + 1,
                    invoice_id = record.invoice_id(),
                    reason = ?decision.reason,
                    "invoice line rejected"
                );
                match decision.reason {
                    LineReason::TaxFieldsInvalid => rejected_tax_fields += 1,
                    LineReason::IdentificationFieldsInvalid => rejected_identification += 1,
                    LineReason::NetAmountMismatch => rejected_net_amount += 1,
                    LineReason::Accepted => {}
                }
            }
        }
    }

    // --- Duplicate invoice ids, over stage-one survivors only ---
    // BTreeMap keeps the report's group order deterministic.
    let mut id_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for line in &survivors {
        *id_counts
            .entry(InvoiceRecord::parse(line).invoice_id())
            .or_insert(0) += 1;
    }

    let mut duplicate_groups: Vec<DuplicateIdGroup> = Vec::new();
    let mut duplicate_lines_removed = 0;
    for (id, count) in &id_counts {
        if *count >= 2 {
            debug!(
                invoice_id = *id,
                count = *count,
                "duplicate invoice id, removing whole group"
            );
            duplicate_groups.push(DuplicateIdGroup {
                invoice_id: (*id).to_string(),
                count: *count,
            });
            duplicate_lines_removed += *count;
        }
    }

    // --- Assembly: header first, survivors verbatim in input order ---
    let mut result: Vec<String> = Vec::with_capacity(1 + survivors.len());
    result.push(lines[0].clone());
    result.extend(
        survivors
            .iter()
            .copied()
            .filter(|line| id_counts[InvoiceRecord::parse(line).invoice_id()] == 1)
            .cloned(),
    );

    let accepted = result.len() - 1;
    info!(total_lines, accepted, "invoice batch filtered");

    let report = FilterReport {
        total_lines,
        accepted,
        rejected_tax_fields,
        rejected_identification,
        rejected_net_amount,
        duplicate_groups,
        duplicate_lines_removed,
    };

    Ok((result, report))
}

/// Filter an invoice batch. See [`apply_with_report`] for the full contract;
/// this variant drops the report.
pub fn apply(lines: &[String]) -> Result<Vec<String>, InvalidFileError> {
    apply_with_report(lines).map(|(result, _)| result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
