use burn::nn::{Initializer, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;
use log::info;

use super::{ModelError, ModelOptions, ModelVariant, ParameterInit};

/// Policy/value network over the flattened board planes.
///
/// ```text
/// Input:       [batch, input_size]
/// Trunk:       optional, input_size -> filter_width, ReLU, then block_count residual blocks
/// Policy head: -> [batch, output_size] logits
/// Value head:  -> [batch, 1], tanh
/// ```
#[derive(Module, Debug)]
pub struct DualHeadNetwork<B: Backend> {
    trunk: Option<Trunk<B>>,
    policy_head: Linear<B>,
    value_head: Linear<B>,
}

#[derive(Module, Debug)]
pub struct Trunk<B: Backend> {
    input: Linear<B>,
    blocks: Vec<ResidualBlock<B>>,
    relu: Relu,
}

#[derive(Module, Debug)]
pub struct ResidualBlock<B: Backend> {
    first: Linear<B>,
    second: Linear<B>,
    relu: Relu,
}

/// Policy probabilities and value estimates, one row per input row.
#[derive(Clone, Debug, PartialEq)]
pub struct Predictions {
    pub policy: Vec<Vec<f32>>,
    pub value: Vec<f32>,
}

pub fn build_model<B: Backend>(
    options: &ModelOptions,
    device: &B::Device,
) -> Result<DualHeadNetwork<B>, ModelError> {
    options.validate()?;

    let linear = |d_input: usize, d_output: usize| -> Linear<B> {
        let config = LinearConfig::new(d_input, d_output);
        let config = match options.initializer {
            ParameterInit::Random => config,
            ParameterInit::Zeros => config.with_initializer(Initializer::Zeros),
        };
        config.init(device)
    };

    let (trunk, head_input) = match options.variant {
        ModelVariant::Linear => (None, options.input_size),
        ModelVariant::SharedTrunk => {
            let width = options.filter_width;
            let trunk = Trunk {
                input: linear(options.input_size, width),
                blocks: (0..options.block_count)
                    .map(|_| ResidualBlock {
                        first: linear(width, width),
                        second: linear(width, width),
                        relu: Relu::new(),
                    })
                    .collect(),
                relu: Relu::new(),
            };
            (Some(trunk), width)
        }
    };

    let network = DualHeadNetwork {
        trunk,
        policy_head: linear(head_input, options.output_size),
        value_head: linear(head_input, 1),
    };

    info!(
        "Built {:?} network with {} parameters",
        options.variant,
        network.num_params()
    );

    Ok(network)
}

impl<B: Backend> ResidualBlock<B> {
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.first.forward(input.clone()));
        let x = self.second.forward(x);
        self.relu.forward(x + input)
    }
}

impl<B: Backend> Trunk<B> {
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.input.forward(input));
        self.blocks.iter().fold(x, |x, block| block.forward(x))
    }
}

impl<B: Backend> DualHeadNetwork<B> {
    /// Forward pass: input [batch, input_size] -> (policy logits [batch, output_size], value [batch, 1]).
    pub fn forward(&self, input: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let features = match &self.trunk {
            Some(trunk) => trunk.forward(input),
            None => input,
        };

        let logits = self.policy_head.forward(features.clone());
        let value = self.value_head.forward(features).tanh();

        (logits, value)
    }

    pub fn predict(&self, input: Tensor<B, 2>) -> Predictions {
        let [rows, _] = input.dims();
        let (logits, value) = self.forward(input);
        let probabilities = softmax(logits, 1);
        let [_, columns] = probabilities.dims();

        let flat = probabilities.into_data().iter::<f32>().collect::<Vec<_>>();

        Predictions {
            policy: flat.chunks(columns.max(1)).take(rows).map(<[f32]>::to_vec).collect(),
            value: value.into_data().iter::<f32>().collect(),
        }
    }

    /// Sum of the squared weights of both heads.
    pub fn head_weight_penalty(&self) -> Tensor<B, 1> {
        let policy = self.policy_head.weight.val().powf_scalar(2.0).sum();
        let value = self.value_head.weight.val().powf_scalar(2.0).sum();

        policy + value
    }

    /// All weights and biases, flattened in a fixed layer order.
    pub fn flat_parameters(&self) -> Vec<f32> {
        let mut layers = vec![];
        if let Some(trunk) = &self.trunk {
            layers.push(&trunk.input);
            for block in &trunk.blocks {
                layers.push(&block.first);
                layers.push(&block.second);
            }
        }
        layers.push(&self.policy_head);
        layers.push(&self.value_head);

        layers
            .into_iter()
            .flat_map(|layer| {
                let mut values = layer.weight.val().into_data().iter::<f32>().collect::<Vec<_>>();
                if let Some(bias) = &layer.bias {
                    values.extend(bias.val().into_data().iter::<f32>());
                }
                values
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use burn::backend::NdArray;
    use burn::tensor::{ElementConversion, TensorData};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    type TestBackend = NdArray;

    fn input(rows: usize, rng: &mut StdRng) -> Tensor<TestBackend, 2> {
        let values = (0..rows * 50)
            .map(|_| if rng.gen_bool(0.3) { 1.0 } else { 0.0 })
            .collect::<Vec<f32>>();

        Tensor::from_data(TensorData::new(values, [rows, 50]), &Default::default())
    }

    fn assert_valid_predictions(predictions: &Predictions, rows: usize) {
        assert_eq!(predictions.policy.len(), rows);
        assert_eq!(predictions.value.len(), rows);

        for policy in &predictions.policy {
            assert_eq!(policy.len(), 25);
            assert!(policy.iter().all(|&p| p >= 0.0));
            assert_approx_eq!(policy.iter().sum::<f32>(), 1.0, 1e-5);
        }

        for &value in &predictions.value {
            assert!(value > -1.0 && value < 1.0, "value {} out of range", value);
        }
    }

    #[test]
    fn test_linear_predictions_are_normalized_and_bounded() {
        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(5);
        let network = build_model::<TestBackend>(&ModelOptions::linear(), &device).unwrap();

        let predictions = network.predict(input(16, &mut rng));

        assert_valid_predictions(&predictions, 16);
    }

    #[test]
    fn test_linear_handles_full_and_empty_boards() {
        let device = Default::default();
        let network = build_model::<TestBackend>(&ModelOptions::linear(), &device).unwrap();
        let mut values = vec![0.0f32; 50];
        values.extend(vec![1.0f32; 50]);

        let predictions =
            network.predict(Tensor::from_data(TensorData::new(values, [2, 50]), &device));

        assert_valid_predictions(&predictions, 2);
    }

    #[test]
    fn test_shared_trunk_predictions_are_normalized_and_bounded() {
        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(9);
        let network = build_model::<TestBackend>(&ModelOptions::default(), &device).unwrap();

        let predictions = network.predict(input(8, &mut rng));

        assert_valid_predictions(&predictions, 8);
    }

    #[test]
    fn test_zero_init_outputs_uniform_policy_and_neutral_value() {
        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(1);
        let options = ModelOptions::default().with_initializer(ParameterInit::Zeros);
        let network = build_model::<TestBackend>(&options, &device).unwrap();

        let predictions = network.predict(input(3, &mut rng));

        for policy in &predictions.policy {
            for &p in policy {
                assert_approx_eq!(p, 0.04, 1e-6);
            }
        }
        assert_eq!(predictions.value, vec![0.0; 3]);
        assert!(network.flat_parameters().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_parameter_counts() {
        let device = Default::default();
        let linear = build_model::<TestBackend>(&ModelOptions::linear(), &device).unwrap();
        let trunk = build_model::<TestBackend>(&ModelOptions::default(), &device).unwrap();

        // Policy head 50x25 + 25, value head 50x1 + 1.
        assert_eq!(linear.flat_parameters().len(), 50 * 25 + 25 + 50 + 1);
        assert_eq!(linear.num_params(), linear.flat_parameters().len());

        // Input 50x25 + 25, two blocks of two 25x25 + 25 layers, heads over 25 features.
        let expected = (50 * 25 + 25) + 4 * (25 * 25 + 25) + (25 * 25 + 25) + (25 + 1);
        assert_eq!(trunk.flat_parameters().len(), expected);
    }

    #[test]
    fn test_head_weight_penalty() {
        let device = Default::default();
        let zeros = build_model::<TestBackend>(
            &ModelOptions::linear().with_initializer(ParameterInit::Zeros),
            &device,
        )
        .unwrap();
        let random = build_model::<TestBackend>(&ModelOptions::linear(), &device).unwrap();

        let zero_penalty: f32 = zeros.head_weight_penalty().into_scalar().elem();
        let random_penalty: f32 = random.head_weight_penalty().into_scalar().elem();

        assert_eq!(zero_penalty, 0.0);
        assert!(random_penalty > 0.0);
    }

    #[test]
    fn test_invalid_options() {
        let options = ModelOptions {
            output_size: 0,
            ..ModelOptions::default()
        };

        let result = build_model::<TestBackend>(&options, &Default::default());

        assert!(matches!(result, Err(ModelError::InvalidOptions(_))));
    }
}
