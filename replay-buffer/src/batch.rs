use itertools::multiunzip;
use std::fmt::{self, Display};

use super::TrainingSample;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TensorRole {
    BoardFeatures,
    PolicyTarget,
    ValueTarget,
}

impl TensorRole {
    pub const ALL: [TensorRole; 3] = [
        TensorRole::BoardFeatures,
        TensorRole::PolicyTarget,
        TensorRole::ValueTarget,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TensorRole::BoardFeatures => "boardFeatures",
            TensorRole::PolicyTarget => "policyTarget",
            TensorRole::ValueTarget => "valueTarget",
        }
    }
}

impl Display for TensorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rows of training data, one row per sample, kept as parallel sequences per tensor role.
///
/// The sequences are public so that callers can build a batch by hand. Consumers are expected to
/// check that the row counts agree before using it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    pub board_features: Vec<Vec<f32>>,
    pub policy_targets: Vec<Vec<f32>>,
    pub value_targets: Vec<f32>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: impl IntoIterator<Item = TrainingSample>) -> Self {
        let (board_features, policy_targets, value_targets): (Vec<_>, Vec<_>, Vec<_>) = multiunzip(
            samples
                .into_iter()
                .map(|s| (s.board_features, s.policy_target, s.value_target)),
        );

        Self {
            board_features,
            policy_targets,
            value_targets,
        }
    }

    pub fn push(&mut self, sample: TrainingSample) {
        self.board_features.push(sample.board_features);
        self.policy_targets.push(sample.policy_target);
        self.value_targets.push(sample.value_target);
    }

    pub fn rows(&self, role: TensorRole) -> usize {
        match role {
            TensorRole::BoardFeatures => self.board_features.len(),
            TensorRole::PolicyTarget => self.policy_targets.len(),
            TensorRole::ValueTarget => self.value_targets.len(),
        }
    }

    /// Number of rows, or `None` when the roles disagree.
    pub fn len(&self) -> Option<usize> {
        let rows = self.board_features.len();
        TensorRole::ALL
            .iter()
            .all(|&role| self.rows(role) == rows)
            .then_some(rows)
    }

    pub fn is_empty(&self) -> bool {
        TensorRole::ALL.iter().all(|&role| self.rows(role) == 0)
    }

    /// Copies the given rows, in the given order, into a new batch.
    pub fn select(&self, indices: &[usize]) -> Batch {
        Batch {
            board_features: indices.iter().map(|&i| self.board_features[i].clone()).collect(),
            policy_targets: indices.iter().map(|&i| self.policy_targets[i].clone()).collect(),
            value_targets: indices.iter().map(|&i| self.value_targets[i]).collect(),
        }
    }

    /// Splits off the trailing `fraction` of rows, returning `(train, validation)`.
    ///
    /// The training split keeps `floor(rows * (1 - fraction))` rows, so any non-zero fraction of
    /// a small batch holds out at least one row. Rows are not shuffled before splitting, the
    /// validation rows are always the last ones.
    pub fn split_validation(mut self, fraction: f64) -> (Batch, Batch) {
        let rows = self.board_features.len();
        let fraction = fraction.clamp(0.0, 1.0);
        let split_at = ((rows as f64 * (1.0 - fraction)).floor() as usize).min(rows);

        let validation = Batch {
            board_features: self.board_features.split_off(split_at.min(self.board_features.len())),
            policy_targets: self.policy_targets.split_off(split_at.min(self.policy_targets.len())),
            value_targets: self.value_targets.split_off(split_at.min(self.value_targets.len())),
        };

        (self, validation)
    }
}
