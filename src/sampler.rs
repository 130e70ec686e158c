//! Seedable source of uniform deviates

use rand::prelude::*;
use rand_xoshiro::Xoshiro256StarStar;

/// Draws uniformly distributed numbers from a xoshiro256** generator.
///
/// Independent runs, i.e. the iterations of a job, each get their
/// own stream: stream `k` is the seeded generator advanced by `k`
/// jumps of 2^128 draws, so the streams never overlap and the output
/// of a run does not depend on how many runs execute in parallel.
#[derive(Clone, Debug)]
pub struct UniformSampler {
    rng: Xoshiro256StarStar,
}

impl UniformSampler {
    pub fn from_seed(seed: u64) -> Self {
        UniformSampler {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// The `index`-th independent stream derived from `seed`
    pub fn stream(seed: u64, index: usize) -> Self {
        let mut sampler = Self::from_seed(seed);
        for _ in 0..index {
            sampler.rng.jump();
        }
        sampler
    }

    /// Uniform in [0, 1)
    pub fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform in [lo, hi)
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.unit()
    }

    /// Cosine of a polar angle, for directions distributed isotropically
    pub fn cos_theta(&mut self) -> f64 {
        self.uniform(-1.0, 1.0)
    }

    /// Polar angle in [0, pi], isotropic over the sphere
    pub fn polar_angle(&mut self) -> f64 {
        self.cos_theta().acos()
    }

    /// Azimuthal angle in [-pi, pi)
    pub fn azimuth(&mut self) -> f64 {
        use std::f64::consts;
        self.uniform(-consts::PI, consts::PI)
    }
}
