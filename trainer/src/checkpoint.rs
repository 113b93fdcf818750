use burn::module::{AutodiffModule, Module};
use burn::optim::Optimizer;
use burn::record::DefaultRecorder;
use burn::tensor::backend::AutodiffBackend;
use log::info;
use model::{write_options, DualHeadNetwork};
use std::fs;
use std::path::{Path, PathBuf};

use super::{TrainError, TrainingContext};

pub const MODEL_FILE_NAME: &str = "model";

/// Writes `model-options.json` and the trained parameters into `model_dir`, creating it if needed.
/// Returns the path the parameters were written to, without the recorder's extension.
pub fn save_checkpoint<B, O>(
    context: &TrainingContext<B, O>,
    model_dir: &Path,
) -> Result<PathBuf, TrainError>
where
    B: AutodiffBackend,
    O: Optimizer<DualHeadNetwork<B>, B>,
{
    fs::create_dir_all(model_dir)
        .map_err(|e| TrainError::Checkpoint(format!("{:?}: {}", model_dir, e)))?;

    write_options(model_dir, context.model_options())
        .map_err(|e| TrainError::Checkpoint(format!("{:#}", e)))?;

    let model_path = model_dir.join(MODEL_FILE_NAME);
    context
        .model()
        .clone()
        .valid()
        .save_file(model_path.clone(), &DefaultRecorder::default())
        .map_err(|e| TrainError::Checkpoint(format!("{:?}: {}", model_path, e)))?;

    info!("Saved model to {:?}", model_dir);

    Ok(model_path)
}
