mod batch;
mod dataset;
mod error;
mod sample;

pub use batch::*;
pub use dataset::*;
pub use error::*;
pub use sample::*;
