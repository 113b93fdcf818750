use replay_buffer::TensorRole;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("batch has {actual} {role} rows, expected {expected}")]
    BatchShapeMismatch {
        role: TensorRole,
        expected: usize,
        actual: usize,
    },

    #[error("{role} row {row} has {actual} columns, expected {expected}")]
    RowWidthMismatch {
        role: TensorRole,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("batch has no rows")]
    EmptyBatch,

    #[error("invalid model options: {0}")]
    InvalidOptions(String),
}

impl ModelError {
    /// Whether the error describes a batch whose tensors do not line up.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            ModelError::BatchShapeMismatch { .. } | ModelError::RowWidthMismatch { .. }
        )
    }
}
