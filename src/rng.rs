use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform draws used by the simulation.
///
/// Every `rand::RngCore` is a `RandomSource`, so tests can hand the game a seeded
/// `StdRng` while the binary uses [`ClockRng`].
pub trait RandomSource {
    /// Uniform float in `[min, max]`.
    fn float(&mut self, min: f64, max: f64) -> f64;

    /// Uniform integer in `min..=max`.
    fn int(&mut self, min: i32, max: i32) -> i32;
}

impl<R: RngCore> RandomSource for R {
    fn float(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.gen_range(min..=max)
    }

    fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.gen_range(min..=max)
    }
}

/// Wall-clock seeded generator. The seed is taken on the first draw and never again.
#[derive(Debug, Default)]
pub struct ClockRng {
    inner: Option<SmallRng>,
}

impl ClockRng {
    pub fn new() -> Self {
        ClockRng { inner: None }
    }

    fn generator(&mut self) -> &mut SmallRng {
        self.inner.get_or_insert_with(|| {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_nanos() as u64)
                .unwrap_or_default();
            info!("Seeding random source from clock: {}", seed);
            SmallRng::seed_from_u64(seed)
        })
    }
}

impl RandomSource for ClockRng {
    fn float(&mut self, min: f64, max: f64) -> f64 {
        self.generator().float(min, max)
    }

    fn int(&mut self, min: i32, max: i32) -> i32 {
        self.generator().int(min, max)
    }
}
