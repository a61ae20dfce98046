//! Deterministic random stream derivation.
//!
//! Every sampler in a run owns an independent `Pcg64` stream seeded from
//! `(root seed, model id)`. The derivation mixes an FNV-1a hash of the id
//! with the root seed through splitmix64, so adding or removing one model
//! never shifts the draws of another and reseeding the run reseeds every
//! stream coherently.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// 64-bit FNV-1a hash, const-friendly.
pub const fn fnv1a64(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut hash: u64 = 0xcbf29ce484222325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }
    hash
}

/// Derive the stream seed for a named sampler from the run's root seed.
pub fn stream_seed(root_seed: u64, label: &str) -> u64 {
    splitmix64(root_seed ^ fnv1a64(label))
}

/// A named, reproducible random stream.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: Pcg64,
}

impl SimRng {
    /// Create the stream keyed by `(root_seed, label)`.
    pub fn for_stream(root_seed: u64, label: &str) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(stream_seed(root_seed, label)),
        }
    }

    /// Borrow the underlying generator for distribution sampling.
    pub fn inner(&mut self) -> &mut Pcg64 {
        &mut self.rng
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}
