mod constants;
mod error;
mod training_game;
mod training_game_builder;
mod training_game_persistance;

pub use constants::*;
pub use error::*;
pub use training_game::*;
pub use training_game_builder::*;
pub use training_game_persistance::*;
