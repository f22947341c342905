//! Deterministic seed derivation for plan and fold generation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Substream used when generating a space-filling sampling plan.
pub const SAMPLING_PLAN_STREAM: u64 = 0x706c_616e;
/// Substream used when shuffling training point indices into folds.
pub const FOLD_SHUFFLE_STREAM: u64 = 0x666f_6c64;

/// Derives the deterministic seed for a specific substream.
///
/// Seeds are obtained by hashing `(master_seed, substream)` with SipHash-1-3
/// keyed with zeros, so every process that shares a campaign seed agrees on
/// the stream regardless of platform.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}

/// Builds a `StdRng` seeded for the given substream.
pub fn substream_rng(master_seed: u64, substream: u64) -> StdRng {
    StdRng::seed_from_u64(derive_substream_seed(master_seed, substream))
}
