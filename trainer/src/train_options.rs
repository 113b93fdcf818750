use anyhow::{anyhow, Result};
use common::{Config, ConfigLoader};
use model::{JointLoss, LossWeights};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainOptions {
    pub learning_rate: f64,
    pub momentum: f64,
    pub l2_scale: f32,
    pub policy_loss_weight: f32,
    pub value_loss_weight: f32,
    pub epochs: usize,
    pub batch_size: usize,
    pub validation_fraction: f64,
    pub seed: Option<u64>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            momentum: 0.9,
            l2_scale: 1e-4,
            policy_loss_weight: 1.0,
            value_loss_weight: 1.0,
            epochs: 10,
            batch_size: 100,
            validation_fraction: 0.1,
            seed: None,
        }
    }
}

impl TrainOptions {
    pub fn joint_loss(&self) -> JointLoss {
        JointLoss {
            weights: LossWeights {
                policy: self.policy_loss_weight,
                value: self.value_loss_weight,
            },
            l2_scale: self.l2_scale,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(anyhow!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..1.0).contains(&self.momentum) {
            return Err(anyhow!("momentum must be in [0, 1), got {}", self.momentum));
        }

        if self.l2_scale < 0.0 || self.policy_loss_weight < 0.0 || self.value_loss_weight < 0.0 {
            return Err(anyhow!("l2_scale and loss weights must not be negative"));
        }

        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be positive"));
        }

        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(anyhow!(
                "validation_fraction must be in [0, 1), got {}",
                self.validation_fraction
            ));
        }

        Ok(())
    }
}

impl Config for TrainOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        let options = Self {
            learning_rate: config
                .get_f64("learning_rate")?
                .unwrap_or(defaults.learning_rate),
            momentum: config.get_f64("momentum")?.unwrap_or(defaults.momentum),
            l2_scale: config.get_f32("l2_scale")?.unwrap_or(defaults.l2_scale),
            policy_loss_weight: config
                .get_f32("policy_loss_weight")?
                .unwrap_or(defaults.policy_loss_weight),
            value_loss_weight: config
                .get_f32("value_loss_weight")?
                .unwrap_or(defaults.value_loss_weight),
            epochs: config.get_usize("epochs")?.unwrap_or(defaults.epochs),
            batch_size: config.get_usize("batch_size")?.unwrap_or(defaults.batch_size),
            validation_fraction: config
                .get_f64("validation_fraction")?
                .unwrap_or(defaults.validation_fraction),
            seed: config.get_usize("seed")?.map(|seed| seed as u64),
        };

        options.validate()?;

        Ok(options)
    }
}
