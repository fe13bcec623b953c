//! Readers for the externally trained parameter tables.
//!
//! Parameter files are parsed leniently: the first unrecognised label name
//! or malformed row stops parsing of that file, entries parsed so far stay in
//! effect, and the stop is reported as [`ParseStatus::Truncated`] instead of
//! an error. Only an unreadable file aborts the run.

pub mod parameters;
pub mod tabular;

pub use parameters::{
    load_emission_stats, load_transition_probabilities, load_transition_stats,
    parse_emission_stats, parse_transition_probabilities, parse_transition_stats,
    MIN_TRANSITION_SAMPLES,
};

use serde::Serialize;

/// Why parsing of a parameter table stopped early.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Truncation {
    /// A row named a type that is not an airway generation.
    UnknownType { line: usize, name: String },
    /// A row had missing or non-numeric values.
    Malformed { line: usize, message: String },
    /// The data ended before the expected number of rows.
    MissingRows { expected: usize, found: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseStatus {
    Complete,
    Truncated(Truncation),
}

impl ParseStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, ParseStatus::Complete)
    }
}

/// Parsed value together with how parsing ended.
#[derive(Clone, Debug)]
pub struct ParseOutcome<T> {
    pub value: T,
    pub status: ParseStatus,
    /// Rows applied to `value`.
    pub rows: usize,
    /// Well-formed rows intentionally ignored (e.g. insufficient support).
    pub skipped: usize,
}

/// Summary of one parameter file, kept for the run report.
#[derive(Clone, Debug, Serialize)]
pub struct ParameterFileReport {
    pub kind: &'static str,
    pub rows: usize,
    pub skipped: usize,
    pub status: ParseStatus,
}

impl<T> ParseOutcome<T> {
    pub fn report(&self, kind: &'static str) -> ParameterFileReport {
        ParameterFileReport {
            kind,
            rows: self.rows,
            skipped: self.skipped,
            status: self.status.clone(),
        }
    }
}
