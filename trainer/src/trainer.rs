use burn::optim::Optimizer;
use burn::tensor::backend::AutodiffBackend;
use log::info;
use model::{check_batch_shape, DualHeadNetwork, Losses, ModelError, Predictions};
use rand::seq::SliceRandom;
use rand::Rng;
use replay_buffer::Batch;

use super::{TrainError, TrainOptions, TrainingContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainerState {
    /// Parameters are initialized and further steps may be taken.
    Ready,
    /// `run` has completed its epochs.
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub steps: usize,
    /// Mean of the per step losses, weighted by the rows in each step.
    pub train: Losses,
    /// `None` when no rows were held out.
    pub validation: Option<Losses>,
}

pub struct Trainer<B: AutodiffBackend, O> {
    context: TrainingContext<B, O>,
    state: TrainerState,
}

impl<B, O> Trainer<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<DualHeadNetwork<B>, B>,
{
    pub fn new(context: TrainingContext<B, O>) -> Self {
        Self {
            context,
            state: TrainerState::Ready,
        }
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn context(&self) -> &TrainingContext<B, O> {
        &self.context
    }

    pub fn forward(&self, batch: &Batch) -> Result<Predictions, TrainError> {
        self.context.forward(batch)
    }

    pub fn evaluate(&self, batch: &Batch) -> Result<Losses, TrainError> {
        self.context.evaluate(batch)
    }

    pub fn step(&mut self, batch: &Batch) -> Result<Losses, TrainError> {
        self.assert_ready()?;

        self.context.step(batch)
    }

    /// Holds out the trailing `validation_fraction` of rows, then trains for `epochs` epochs over
    /// the remaining rows in shuffled mini-batches of `batch_size`.
    ///
    /// The trainer is `Done` afterwards, even when no epochs were requested.
    pub fn run<R>(
        &mut self,
        dataset: Batch,
        options: &TrainOptions,
        rng: &mut R,
    ) -> Result<Vec<EpochReport>, TrainError>
    where
        R: Rng + ?Sized,
    {
        self.assert_ready()?;

        let model_options = self.context.model_options();
        check_batch_shape(&dataset, model_options.input_size, model_options.output_size)
            .map_err(|e| match e {
                ModelError::EmptyBatch => TrainError::EmptyDataset,
                e => TrainError::Model(e),
            })?;

        let (train, validation) = dataset.split_validation(options.validation_fraction);
        let train_rows = train.board_features.len();
        let validation_rows = validation.board_features.len();

        if train_rows == 0 {
            return Err(TrainError::EmptyDataset);
        }

        let batch_size = options.batch_size.max(1);
        let steps = train_rows.div_ceil(batch_size);

        info!(
            "Train on {} samples, validate on {} samples",
            train_rows, validation_rows
        );

        let mut indices = (0..train_rows).collect::<Vec<_>>();
        let mut reports = Vec::with_capacity(options.epochs);

        for epoch in 1..=options.epochs {
            indices.shuffle(rng);

            let mut step_losses = Vec::with_capacity(steps);
            for chunk in indices.chunks(batch_size) {
                let losses = self.context.step(&train.select(chunk))?;
                step_losses.push((losses, chunk.len()));
            }

            let validation = if validation_rows > 0 {
                Some(self.context.evaluate(&validation)?)
            } else {
                None
            };

            let report = EpochReport {
                epoch,
                steps,
                train: weighted_mean(&step_losses),
                validation,
            };

            log_epoch(&report, options.epochs);

            reports.push(report);
        }

        self.state = TrainerState::Done;

        Ok(reports)
    }

    fn assert_ready(&self) -> Result<(), TrainError> {
        match self.state {
            TrainerState::Ready => Ok(()),
            TrainerState::Done => Err(TrainError::TrainingFinished),
        }
    }
}

fn weighted_mean(step_losses: &[(Losses, usize)]) -> Losses {
    let rows = step_losses.iter().map(|(_, rows)| *rows).sum::<usize>().max(1) as f32;

    let sum = step_losses
        .iter()
        .fold(Losses::default(), |acc, (losses, rows)| {
            let weight = *rows as f32;
            Losses {
                total: acc.total + losses.total * weight,
                policy: acc.policy + losses.policy * weight,
                value: acc.value + losses.value * weight,
                l2: acc.l2 + losses.l2 * weight,
            }
        });

    Losses {
        total: sum.total / rows,
        policy: sum.policy / rows,
        value: sum.value / rows,
        l2: sum.l2 / rows,
    }
}

fn log_epoch(report: &EpochReport, epochs: usize) {
    let train = &report.train;
    let mut line = format!(
        "Epoch {}/{} - {} steps - loss: {:.4} - policy_loss: {:.4} - value_loss: {:.4}",
        report.epoch, epochs, report.steps, train.total, train.policy, train.value
    );

    if let Some(validation) = &report.validation {
        line.push_str(&format!(
            " - val_loss: {:.4} - val_policy_loss: {:.4} - val_value_loss: {:.4}",
            validation.total, validation.policy, validation.value
        ));
    }

    info!("{}", line);
}
