use log::info;
use rand::prelude::{SeedableRng, StdRng};

/// Creates the random source used for sampling and shuffling.
///
/// A fixed seed makes a run reproducible. Without one the generator is seeded from OS entropy.
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            info!("Seeding rng with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}
