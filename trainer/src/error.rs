use model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("training has finished, no further steps can be taken")]
    TrainingFinished,

    #[error("dataset has no training rows")]
    EmptyDataset,

    #[error("loss became non-finite ({0}), parameters were left unchanged")]
    NonFiniteLoss(f32),

    #[error("failed to write checkpoint: {0}")]
    Checkpoint(String),
}

impl TrainError {
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, TrainError::Model(e) if e.is_shape_mismatch())
    }
}
