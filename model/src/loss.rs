use burn::prelude::*;
use burn::tensor::ElementConversion;
use serde::{Deserialize, Serialize};

use super::{BatchTensors, DualHeadNetwork};

/// Relative importance of the policy and value terms of the joint loss.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LossWeights {
    pub policy: f32,
    pub value: f32,
}

impl Default for LossWeights {
    fn default() -> Self {
        Self {
            policy: 1.0,
            value: 1.0,
        }
    }
}

/// policy_weight * CE(policy) + value_weight * MSE(value) + l2_scale * ||head weights||^2
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointLoss {
    pub weights: LossWeights,
    pub l2_scale: f32,
}

/// The individual terms of the joint loss. Each term is unweighted, `total` carries the weights.
pub struct LossTerms<B: Backend> {
    pub total: Tensor<B, 1>,
    pub policy: Tensor<B, 1>,
    pub value: Tensor<B, 1>,
    pub l2: Tensor<B, 1>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Losses {
    pub total: f32,
    pub policy: f32,
    pub value: f32,
    pub l2: f32,
}

impl JointLoss {
    pub fn forward<B: Backend>(
        &self,
        model: &DualHeadNetwork<B>,
        tensors: &BatchTensors<B>,
    ) -> LossTerms<B> {
        let (logits, value) = model.forward(tensors.board_features.clone());

        let policy = categorical_cross_entropy(logits, tensors.policy_targets.clone());
        let value = mean_squared_error(value, tensors.value_targets.clone());
        let l2 = model.head_weight_penalty();

        let total = policy.clone().mul_scalar(self.weights.policy)
            + value.clone().mul_scalar(self.weights.value)
            + l2.clone().mul_scalar(self.l2_scale);

        LossTerms {
            total,
            policy,
            value,
            l2,
        }
    }
}

impl<B: Backend> LossTerms<B> {
    pub fn to_losses(&self) -> Losses {
        Losses {
            total: scalar(&self.total),
            policy: scalar(&self.policy),
            value: scalar(&self.value),
            l2: scalar(&self.l2),
        }
    }
}

fn scalar<B: Backend>(tensor: &Tensor<B, 1>) -> f32 {
    tensor.clone().into_scalar().elem::<f32>()
}

/// Mean over rows of `-sum(target * log_softmax(logits))`.
///
/// Working on log probabilities keeps the loss finite when a target entry is zero and the model
/// assigns that cell a vanishing probability.
pub fn categorical_cross_entropy<B: Backend>(
    logits: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_probs = stable_log_softmax(logits);

    (targets * log_probs).sum_dim(1).mean().neg()
}

// Shift by the row max before exponentiating so large logits cannot overflow.
fn stable_log_softmax<B: Backend>(logits: Tensor<B, 2>) -> Tensor<B, 2> {
    let shifted = logits.clone() - logits.detach().max_dim(1);
    let log_sum_exp = shifted.clone().exp().sum_dim(1).log();

    shifted - log_sum_exp
}

pub fn mean_squared_error<B: Backend>(
    predictions: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    (predictions - targets).powf_scalar(2.0).mean()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{build_model, ModelOptions, ParameterInit};
    use assert_approx_eq::assert_approx_eq;
    use burn::backend::NdArray;
    use replay_buffer::Batch;

    type TestBackend = NdArray;

    fn tensor(values: Vec<f32>, shape: [usize; 2]) -> Tensor<TestBackend, 2> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    #[test]
    fn test_cross_entropy_of_uniform_prediction() {
        let logits = tensor(vec![0.0; 4], [1, 4]);
        let targets = tensor(vec![0.25; 4], [1, 4]);

        let loss = scalar(&categorical_cross_entropy(logits, targets));

        assert_approx_eq!(loss, 4f32.ln(), 1e-5);
    }

    #[test]
    fn test_cross_entropy_is_finite_for_extreme_logits() {
        let logits = tensor(vec![-1000.0, 1000.0], [1, 2]);
        let targets = tensor(vec![1.0, 0.0], [1, 2]);

        let loss = scalar(&categorical_cross_entropy(logits, targets));

        assert!(loss.is_finite());
        assert_approx_eq!(loss, 2000.0, 1e-2);
    }

    #[test]
    fn test_cross_entropy_ignores_zero_targets() {
        let logits = tensor(vec![0.0, 1000.0, -1000.0], [1, 3]);
        let targets = tensor(vec![0.0, 1.0, 0.0], [1, 3]);

        let loss = scalar(&categorical_cross_entropy(logits, targets));

        assert_approx_eq!(loss, 0.0, 1e-5);
    }

    #[test]
    fn test_mean_squared_error_averages_over_batch() {
        let predictions = tensor(vec![0.0, 0.5], [2, 1]);
        let targets = tensor(vec![1.0, -0.5], [2, 1]);

        let loss = scalar(&mean_squared_error(predictions, targets));

        assert_approx_eq!(loss, 1.0, 1e-6);
    }

    #[test]
    fn test_joint_loss_of_zero_model() {
        let device = Default::default();
        let options = ModelOptions::linear().with_initializer(ParameterInit::Zeros);
        let model = build_model::<TestBackend>(&options, &device).unwrap();
        let batch = Batch {
            board_features: vec![vec![1.0; 50]; 2],
            policy_targets: vec![vec![0.04; 25]; 2],
            value_targets: vec![1.0, -1.0],
        };
        let tensors = BatchTensors::from_batch(&batch, 50, 25, &device).unwrap();
        let loss = JointLoss {
            weights: LossWeights {
                policy: 0.5,
                value: 2.0,
            },
            l2_scale: 1e-4,
        };

        let losses = loss.forward(&model, &tensors).to_losses();

        assert_approx_eq!(losses.policy, 25f32.ln(), 1e-4);
        assert_approx_eq!(losses.value, 1.0, 1e-6);
        assert_eq!(losses.l2, 0.0);
        assert_approx_eq!(losses.total, 0.5 * 25f32.ln() + 2.0, 1e-4);
    }

    #[test]
    fn test_l2_term_is_scaled() {
        let device = Default::default();
        let model = build_model::<TestBackend>(&ModelOptions::linear(), &device).unwrap();
        let batch = Batch {
            board_features: vec![vec![0.0; 50]],
            policy_targets: vec![vec![0.04; 25]],
            value_targets: vec![1.0],
        };
        let tensors = BatchTensors::from_batch(&batch, 50, 25, &device).unwrap();
        let without = JointLoss {
            weights: LossWeights::default(),
            l2_scale: 0.0,
        };
        let with = JointLoss {
            weights: LossWeights::default(),
            l2_scale: 0.5,
        };

        let without = without.forward(&model, &tensors).to_losses();
        let with = with.forward(&model, &tensors).to_losses();

        assert!(with.l2 > 0.0);
        assert_approx_eq!(with.total - without.total, 0.5 * with.l2, 1e-4);
    }
}
