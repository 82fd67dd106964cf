//! ivd-filter
//!
//! Validation and duplicate removal for delimited invoice batches.
//!
//! Architectural decisions:
//! - A broken header fails the whole batch; a rule violation only drops the
//!   offending line.
//! - Every line is judged independently, in input order, against three
//!   business checks (tax exclusivity, identification exclusivity, net
//!   amount).
//! - Duplicate invoice ids are resolved over the lines that passed the
//!   checks, and a duplicated id drops its entire group — no winner.
//! - Surviving lines pass through verbatim, header first, input order kept.
//! - Pure deterministic logic. No IO, no wall-clock; callers provide the
//!   line sequence and receive a new one.

mod filter;
mod report;
mod rules;

pub use filter::{apply, apply_with_report, InvalidFileError};
pub use report::{DuplicateIdGroup, FilterReport};
pub use rules::{
    check_identification_fields, check_net_amount, check_tax_fields, evaluate_line, LineAction,
    LineDecision, LineReason,
};
