use std::path::PathBuf;

use thiserror::Error;
use training_game::RecordError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("game record has no move snapshots")]
    EmptyRecord,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read game record {path:?}: {source}")]
    CorpusReadFailure {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    #[error("game record {0:?} does not exist")]
    RecordNotFound(PathBuf),

    #[error("game record {0:?} has no move snapshots")]
    EmptyRecord(PathBuf),
}
