use rand::seq::SliceRandom;
use rand::Rng;
use training_game::{GameRecord, MoveSnapshot};

use super::SampleError;

/// Network inputs and training targets derived from one move snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSample {
    pub board_features: Vec<f32>,
    pub policy_target: Vec<f32>,
    pub value_target: f32,
}

impl TrainingSample {
    pub fn from_snapshot(snapshot: &MoveSnapshot) -> Self {
        let board_features = snapshot
            .occupied_by_self
            .iter()
            .chain(snapshot.occupied_by_opponent.iter())
            .copied()
            .collect();

        Self {
            board_features,
            policy_target: snapshot.visit_distribution.clone(),
            value_target: snapshot.winner.value(),
        }
    }
}

/// Picks one move snapshot of the game uniformly at random and converts it to a sample.
///
/// Only a single position per game is taken so that the positions of one game do not dominate a
/// batch. Repeated calls on the same record are expected to return different samples.
pub fn extract_sample<R>(record: &GameRecord, rng: &mut R) -> Result<TrainingSample, SampleError>
where
    R: Rng + ?Sized,
{
    let snapshot = record
        .move_snapshots()
        .choose(rng)
        .ok_or(SampleError::EmptyRecord)?;

    Ok(TrainingSample::from_snapshot(snapshot))
}
