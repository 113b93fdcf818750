mod error;
mod loss;
mod model_options;
mod network;
mod tensors;

pub use error::*;
pub use loss::*;
pub use model_options::*;
pub use network::*;
pub use tensors::*;
