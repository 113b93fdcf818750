use anyhow::{anyhow, Context as AnyhowContext, Result};
use common::{Config, ConfigLoader};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use training_game::{CELL_COUNT, INPUT_SIZE, OUTPUT_SIZE};

use super::ModelError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Each head is a single affine layer over the raw board features.
    Linear,
    /// Board features pass through a residual stack of dense layers shared by both heads.
    SharedTrunk,
}

impl FromStr for ModelVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(ModelVariant::Linear),
            "shared_trunk" => Ok(ModelVariant::SharedTrunk),
            _ => Err(anyhow!(
                "Unknown model variant {}, expected linear or shared_trunk",
                s
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParameterInit {
    Random,
    Zeros,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelOptions {
    pub variant: ModelVariant,
    pub input_size: usize,
    pub output_size: usize,
    pub filter_width: usize,
    pub block_count: usize,
    pub initializer: ParameterInit,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            variant: ModelVariant::SharedTrunk,
            input_size: INPUT_SIZE,
            output_size: OUTPUT_SIZE,
            filter_width: CELL_COUNT,
            block_count: 2,
            initializer: ParameterInit::Random,
        }
    }
}

impl ModelOptions {
    pub fn linear() -> Self {
        Self {
            variant: ModelVariant::Linear,
            ..Self::default()
        }
    }

    pub fn with_initializer(mut self, initializer: ParameterInit) -> Self {
        self.initializer = initializer;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.input_size == 0 || self.output_size == 0 {
            return Err(ModelError::InvalidOptions(format!(
                "input_size ({}) and output_size ({}) must be positive",
                self.input_size, self.output_size
            )));
        }

        if self.variant == ModelVariant::SharedTrunk && self.filter_width == 0 {
            return Err(ModelError::InvalidOptions(
                "filter_width must be positive for the shared trunk".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config for ModelOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        let variant = config
            .get("model_variant")
            .and_then(|v| v.as_string())
            .map(|v| v.parse::<ModelVariant>())
            .transpose()?
            .unwrap_or(defaults.variant);

        let initializer = match config.get_bool("zero_init")? {
            Some(true) => ParameterInit::Zeros,
            _ => defaults.initializer,
        };

        let options = Self {
            variant,
            input_size: defaults.input_size,
            output_size: defaults.output_size,
            filter_width: config
                .get_usize("filter_width")?
                .unwrap_or(defaults.filter_width),
            block_count: config
                .get_usize("block_count")?
                .unwrap_or(defaults.block_count),
            initializer,
        };

        options.validate()?;

        Ok(options)
    }
}

pub fn get_model_options_path(model_dir: &Path) -> PathBuf {
    model_dir.join("model-options.json")
}

pub fn get_options(model_dir: &Path) -> Result<ModelOptions> {
    let file_path = get_model_options_path(model_dir);
    let file_path_lossy = format!("{}", file_path.to_string_lossy());
    let file = File::open(file_path).context(file_path_lossy)?;
    let reader = BufReader::new(file);
    let options = serde_json::from_reader(reader)?;
    Ok(options)
}

pub fn write_options(model_dir: &Path, options: &ModelOptions) -> Result<()> {
    let serialized_options = serde_json::to_string(options)?;

    let file_path = get_model_options_path(model_dir);
    let file_path_lossy = format!("{}", file_path.to_string_lossy());
    let mut file = File::create(file_path).context(file_path_lossy)?;
    writeln!(file, "{}", serialized_options)?;

    Ok(())
}
