use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use log::debug;
use model::{
    build_model, features_to_tensor, BatchTensors, DualHeadNetwork, JointLoss, Losses,
    ModelOptions, Predictions,
};
use replay_buffer::Batch;

use super::{sgd_optimizer, TrainError, TrainOptions};

/// Owns the network parameters and the optimizer state. Only `step` mutates the parameters.
pub struct TrainingContext<B: AutodiffBackend, O> {
    model: DualHeadNetwork<B>,
    optimizer: O,
    loss: JointLoss,
    learning_rate: f64,
    model_options: ModelOptions,
    device: B::Device,
}

/// Builds a fresh network from `model_options` together with a Nesterov momentum SGD optimizer.
pub fn sgd_training_context<B: AutodiffBackend>(
    model_options: &ModelOptions,
    train_options: &TrainOptions,
    device: &B::Device,
) -> Result<TrainingContext<B, impl Optimizer<DualHeadNetwork<B>, B>>, TrainError> {
    let model = build_model::<B>(model_options, device)?;

    Ok(TrainingContext::new(
        model,
        sgd_optimizer::<B>(train_options),
        train_options.joint_loss(),
        train_options.learning_rate,
        model_options.clone(),
        device.clone(),
    ))
}

impl<B, O> TrainingContext<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<DualHeadNetwork<B>, B>,
{
    pub fn new(
        model: DualHeadNetwork<B>,
        optimizer: O,
        loss: JointLoss,
        learning_rate: f64,
        model_options: ModelOptions,
        device: B::Device,
    ) -> Self {
        Self {
            model,
            optimizer,
            loss,
            learning_rate,
            model_options,
            device,
        }
    }

    /// Policy probabilities and value estimates for every row of `batch`. Targets are ignored.
    pub fn forward(&self, batch: &Batch) -> Result<Predictions, TrainError> {
        let input = features_to_tensor::<B>(
            &batch.board_features,
            self.model_options.input_size,
            &self.device,
        )?;

        Ok(self.model.predict(input))
    }

    /// Loss components over `batch` without updating the parameters.
    pub fn evaluate(&self, batch: &Batch) -> Result<Losses, TrainError> {
        let tensors = self.batch_tensors(batch)?;

        Ok(self.loss.forward(&self.model, &tensors).to_losses())
    }

    /// One optimization step over `batch`. Returns the losses observed before the update.
    pub fn step(&mut self, batch: &Batch) -> Result<Losses, TrainError> {
        let tensors = self.batch_tensors(batch)?;

        let terms = self.loss.forward(&self.model, &tensors);
        let losses = terms.to_losses();

        if !losses.total.is_finite() {
            return Err(TrainError::NonFiniteLoss(losses.total));
        }

        let grads = terms.total.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self
            .optimizer
            .step(self.learning_rate, self.model.clone(), grads);

        debug!("Step over {} rows: {:?}", tensors.rows(), losses);

        Ok(losses)
    }

    pub fn model(&self) -> &DualHeadNetwork<B> {
        &self.model
    }

    pub fn model_options(&self) -> &ModelOptions {
        &self.model_options
    }

    pub fn flat_parameters(&self) -> Vec<f32> {
        self.model.flat_parameters()
    }

    fn batch_tensors(&self, batch: &Batch) -> Result<BatchTensors<B>, TrainError> {
        let tensors = BatchTensors::from_batch(
            batch,
            self.model_options.input_size,
            self.model_options.output_size,
            &self.device,
        )?;

        Ok(tensors)
    }
}
