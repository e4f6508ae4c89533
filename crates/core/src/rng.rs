//! Deterministic random streams.
//!
//! Every stream is a `StdRng` seeded from `(base_seed, tag)`, so the draws a
//! user's sessions consume never depend on how many draws another user made.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::user::UserId;

const STREAM_CONTEXT: &str = "cartsim 2025-01-01 deterministic rng stream";
const POPULATION_TAG: &[u8] = b"population";

pub type SimRng = StdRng;

pub fn derive_stream_seed(base_seed: u64, tag: &[u8]) -> u64 {
    let mut hasher = blake3::Hasher::new_derive_key(STREAM_CONTEXT);
    hasher.update(&base_seed.to_le_bytes());
    hasher.update(tag);
    let digest = hasher.finalize();

    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(seed_bytes)
}

pub fn stream(base_seed: u64, tag: &[u8]) -> SimRng {
    StdRng::seed_from_u64(derive_stream_seed(base_seed, tag))
}

/// Stream used to sample the user population.
pub fn population_stream(base_seed: u64) -> SimRng {
    stream(base_seed, POPULATION_TAG)
}

/// Stream that drives every session of one user.
pub fn user_stream(base_seed: u64, user_id: &UserId) -> SimRng {
    let mut tag = Vec::with_capacity(5 + user_id.as_str().len());
    tag.extend_from_slice(b"user:");
    tag.extend_from_slice(user_id.as_str().as_bytes());
    stream(base_seed, &tag)
}
