//! Stochastic neighborhood operators.
//!
//! `apply` never mutates its input: it clones the parent `Schedule` and
//! returns a modified copy, so the worker's `current` is never touched by a
//! failed or rejected mutation attempt.

use crate::error::{PsaError, PsaResult};
use crate::schedule::Schedule;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Capability set a mutation operator implements: `apply(schedule) ->
/// schedule'`. Implementations own a private RNG, so `apply` takes `&mut
/// self`.
pub trait Mutation: MutationClone + Send {
    fn apply(&mut self, schedule: &Schedule) -> PsaResult<Schedule>;

    /// Re-seeds the private RNG. The Coordinator clones one configured
    /// template per worker and calls this with a per-worker-index seed
    /// immediately after, so sibling workers never share RNG state even
    /// though they started from the same template.
    fn reseed(&mut self, seed: u64);
}

/// Object-safe clone support, mirroring [`crate::cooling::CoolingLawClone`] —
/// the Coordinator gives each worker its own cloned mutation instance.
pub trait MutationClone {
    fn clone_box(&self) -> Box<dyn Mutation>;
}

impl<T> MutationClone for T
where
    T: 'static + Mutation + Clone,
{
    fn clone_box(&self) -> Box<dyn Mutation> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Mutation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Combines wall-clock nanoseconds with a caller-supplied salt (typically a
/// worker index) so that sibling workers spawned at nearly the same instant
/// still diverge.
pub fn seed_from_clock(salt: u64) -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ salt.wrapping_mul(0x9E3779B97F4A7C15)
}

/// The default Schedule mutation: Move with probability `p_move`, Swap with
/// probability `1 - p_move`.
#[derive(Debug, Clone)]
pub struct ScheduleMutation {
    p_move: f64,
    rng: StdRng,
}

impl ScheduleMutation {
    /// `p_move` is normalized into `[0, 1]` internally; `p_swap = 1 -
    /// p_move`. `seed` should come from [`seed_from_clock`] combined with a
    /// worker index.
    pub fn new(p_move: f64, seed: u64) -> PsaResult<Self> {
        if !(0.0..=1.0).contains(&p_move) {
            return Err(PsaError::InvalidArgument(
                "p_move must lie in [0, 1]".into(),
            ));
        }
        Ok(Self {
            p_move,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn with_default_probability(seed: u64) -> Self {
        Self::new(0.7, seed).expect("0.7 is a valid probability")
    }

    fn move_op(&mut self, schedule: &Schedule) -> PsaResult<Schedule> {
        let p = schedule.processor_count();
        if p <= 1 {
            return Err(PsaError::InvalidArgument(
                "Move is undefined with a single processor".into(),
            ));
        }
        let mut out = schedule.clone();
        let job = self.rng.random_range(0..schedule.job_count());
        let current = schedule.processor_of(job)?;
        let mut target = self.rng.random_range(0..p - 1);
        if target >= current {
            target += 1;
        }
        out.assign(job, target)?;
        Ok(out)
    }

    fn swap_op(&mut self, schedule: &Schedule) -> PsaResult<Schedule> {
        let occupied: Vec<usize> = (0..schedule.processor_count())
            .filter(|&p| (0..schedule.job_count()).any(|j| schedule.processor_of(j).unwrap() == p))
            .collect();
        if occupied.len() < 2 {
            return self.move_op(schedule);
        }
        let i = self.rng.random_range(0..occupied.len());
        let mut j = self.rng.random_range(0..occupied.len() - 1);
        if j >= i {
            j += 1;
        }
        let (p1, p2) = (occupied[i], occupied[j]);

        let jobs_on = |p: usize| -> Vec<usize> {
            (0..schedule.job_count())
                .filter(|&job| schedule.processor_of(job).unwrap() == p)
                .collect()
        };
        let jobs1 = jobs_on(p1);
        let jobs2 = jobs_on(p2);
        let job1 = jobs1[self.rng.random_range(0..jobs1.len())];
        let job2 = jobs2[self.rng.random_range(0..jobs2.len())];

        let mut out = schedule.clone();
        out.assign(job1, p2)?;
        out.assign(job2, p1)?;
        Ok(out)
    }
}

impl Mutation for ScheduleMutation {
    fn apply(&mut self, schedule: &Schedule) -> PsaResult<Schedule> {
        if self.rng.random::<f64>() < self.p_move {
            self.move_op(schedule)
        } else {
            self.swap_op(schedule)
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
