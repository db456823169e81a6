//! Bulk import outcome models

use serde::Serialize;

/// Why a record was skipped during bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Fewer than the 11 expected fields.
    Malformed { fields: usize },
    /// The record could not be read at all (e.g. unbalanced quotes).
    Unreadable(String),
    MissingRequired,
    InvalidYear(String),
    InvalidPrice(String),
    InvalidAvailability(String),
    DuplicateIsbn(String),
    /// Store rejected the insert; carries the diagnostic.
    Store(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Malformed { fields } => {
                write!(f, "expected 11 fields, got {}", fields)
            }
            SkipReason::Unreadable(msg) => write!(f, "unreadable record: {}", msg),
            SkipReason::MissingRequired => write!(f, "title, authors and ISBN are required"),
            SkipReason::InvalidYear(v) => write!(f, "invalid year '{}'", v),
            SkipReason::InvalidPrice(v) => write!(f, "invalid price '{}'", v),
            SkipReason::InvalidAvailability(v) => write!(f, "invalid availability '{}'", v),
            SkipReason::DuplicateIsbn(isbn) => write!(f, "ISBN '{}' already exists", isbn),
            SkipReason::Store(msg) => write!(f, "store rejected record: {}", msg),
        }
    }
}

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecordOutcome {
    /// Book inserted with the given id.
    Added(i32),
    Skipped(SkipReason),
}

/// Per-line outcome of a bulk import run.
#[derive(Debug, Clone, Serialize)]
pub struct RecordReport {
    /// 1-based line number in the source file.
    pub line: u64,
    pub outcome: RecordOutcome,
}

/// Summary returned by a bulk import run.
///
/// Import is best-effort: a bad record never aborts the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub added: usize,
    pub records: Vec<RecordReport>,
}

impl ImportReport {
    pub fn push(&mut self, line: u64, outcome: RecordOutcome) {
        if matches!(outcome, RecordOutcome::Added(_)) {
            self.added += 1;
        }
        self.records.push(RecordReport { line, outcome });
    }

    pub fn skipped(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, RecordOutcome::Skipped(_)))
            .count()
    }
}
