use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("no game record found at {0:?}")]
    NotFound(PathBuf),

    #[error("malformed game record at {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to access game record at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RecordError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound(_))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidSnapshot {
    #[error("{field} has {actual} entries, expected {expected}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("cell {0} is occupied by both players")]
    DoublyOccupied(usize),

    #[error("visit distribution has a negative entry at cell {0}")]
    NegativeVisits(usize),

    #[error("visit distribution sums to {0}")]
    UnnormalizedVisits(f32),
}
