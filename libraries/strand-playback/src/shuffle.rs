//! Shuffle order generation
//!
//! A shuffle order is a permutation of song indices, produced with
//! Fisher-Yates over an injectable randomness source so tests can pin the
//! exact permutation.

use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};

/// Uniform random index provider
pub trait RandomSource {
    /// Return a uniformly chosen value in `[0, upper)`
    ///
    /// Callers never pass `upper == 0`.
    fn below(&mut self, upper: usize) -> usize;
}

/// Randomness from the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&mut self, upper: usize) -> usize {
        thread_rng().gen_range(0..upper)
    }
}

/// Reproducible randomness from a fixed seed
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn below(&mut self, upper: usize) -> usize {
        (**self).below(upper)
    }
}

/// Build a shuffle order over `count` songs
///
/// Starts from the identity order and, for each position `i` from the last
/// down to 1, swaps it with a position drawn uniformly from `[0, i]`.
pub fn shuffle_order<R: RandomSource + ?Sized>(count: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..count).collect();

    for i in (1..count).rev() {
        let j = rng.below(i + 1);
        order.swap(i, j);
    }

    order
}
