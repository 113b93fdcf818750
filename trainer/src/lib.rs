mod checkpoint;
mod error;
mod train_options;
mod trainer;
mod training_context;

pub use checkpoint::*;
pub use error::*;
pub use train_options::*;
pub use trainer::*;
pub use training_context::*;

use burn::backend::{Autodiff, NdArray};
use burn::optim::momentum::MomentumConfig;
use burn::optim::{Optimizer, SgdConfig};
use burn::tensor::backend::AutodiffBackend;
use model::DualHeadNetwork;

/// CPU backend with gradient tracking, used by the training client.
pub type TrainBackend = Autodiff<NdArray>;

/// SGD with Nesterov momentum and no dampening. Regularization is part of the joint loss, so the
/// optimizer applies no weight decay of its own.
pub fn sgd_optimizer<B: AutodiffBackend>(
    options: &TrainOptions,
) -> impl Optimizer<DualHeadNetwork<B>, B> {
    let momentum = MomentumConfig::new()
        .with_momentum(options.momentum)
        .with_dampening(0.0)
        .with_nesterov(true);

    SgdConfig::new()
        .with_momentum(Some(momentum))
        .init::<B, DualHeadNetwork<B>>()
}
