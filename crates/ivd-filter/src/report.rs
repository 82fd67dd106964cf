//! Batch outcome report.
//!
//! The pipeline already decides which lines survive; the report says what
//! happened and why, deterministically, so an embedding system can log or
//! persist it. It changes nothing about the filtered output itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A duplicated invoice id among the lines that passed the rule checks.
/// The whole group was removed from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateIdGroup {
    pub invoice_id: String,
    /// How many surviving lines carried this id (always >= 2).
    pub count: usize,
}

/// Summary of one `apply_with_report` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Invoice lines seen (header excluded).
    pub total_lines: usize,
    /// Lines present in the output (header excluded).
    pub accepted: usize,
    /// Lines dropped by the tax exclusivity check.
    pub rejected_tax_fields: usize,
    /// Lines dropped by the CIF/NIF exclusivity check.
    pub rejected_identification: usize,
    /// Lines dropped by the net amount check.
    pub rejected_net_amount: usize,
    /// Duplicate id groups among rule-passing lines, sorted by invoice id.
    pub duplicate_groups: Vec<DuplicateIdGroup>,
    /// Total lines dropped by duplicate-group removal.
    pub duplicate_lines_removed: usize,
}

impl FilterReport {
    /// `true` when every input line survived into the output.
    pub fn is_clean(&self) -> bool {
        self.accepted == self.total_lines
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FilterReport {{")?;
        writeln!(f, "  total_lines: {}", self.total_lines)?;
        writeln!(f, "  accepted: {}", self.accepted)?;
        writeln!(f, "  rejected_tax_fields: {}", self.rejected_tax_fields)?;
        writeln!(
            f,
            "  rejected_identification: {}",
            self.rejected_identification
        )?;
        writeln!(f, "  rejected_net_amount: {}", self.rejected_net_amount)?;
        writeln!(f, "  duplicate_groups: {}", self.duplicate_groups.len())?;
        for g in &self.duplicate_groups {
            writeln!(f, "    invoice_id={} count={}", g.invoice_id, g.count)?;
        }
        writeln!(
            f,
            "  duplicate_lines_removed: {}",
            self.duplicate_lines_removed
        )?;
        write!(f, "}}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FilterReport {
        FilterReport {
            total_lines: 5,
            accepted: 2,
            rejected_tax_fields: 1,
            rejected_identification: 0,
            rejected_net_amount: 0,
            duplicate_groups: vec![DuplicateIdGroup {
                invoice_id: "2".to_string(),
                count: 2,
            }],
            duplicate_lines_removed: 2,
        }
    }

    #[test]
    fn is_clean_requires_full_passthrough() {
        assert!(!report().is_clean());

        let clean = FilterReport {
            total_lines: 2,
            accepted: 2,
            rejected_tax_fields: 0,
            rejected_identification: 0,
            rejected_net_amount: 0,
            duplicate_groups: Vec::new(),
            duplicate_lines_removed: 0,
        };
        assert!(clean.is_clean());
    }

    #[test]
    fn display_lists_duplicate_groups() {
        let s = report().to_string();
        assert!(s.contains("total_lines: 5"));
        assert!(s.contains("invoice_id=2 count=2"));
        assert!(s.contains("duplicate_lines_removed: 2"));
    }

    #[test]
    fn report_json_shape_is_stable() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["total_lines"], 5);
        assert_eq!(json["accepted"], 2);
        assert_eq!(json["duplicate_groups"][0]["invoice_id"], "2");
        assert_eq!(json["duplicate_groups"][0]["count"], 2);
    }

    #[test]
    fn report_round_trips_through_json() {
        let r = report();
        let json = serde_json::to_string(&r).unwrap();
        let back: FilterReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
