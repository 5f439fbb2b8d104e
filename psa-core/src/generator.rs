//! Seed schedule constructors.
//!
//! Three pure factories, all returning a fully-assigned [`Schedule`]. None of
//! these hold state between calls; they are plain functions over `(J, P,
//! durations)`.

use crate::error::PsaResult;
use crate::mutation::seed_from_clock;
use crate::schedule::Schedule;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// `a(i) <- uniform(0, P-1)` independently for every job.
pub fn random(job_count: usize, processor_count: usize, durations: Arc<[f64]>) -> PsaResult<Schedule> {
    let mut schedule = Schedule::new(job_count, processor_count, durations)?;
    let mut rng = StdRng::seed_from_u64(seed_from_clock(job_count as u64));
    for job in 0..job_count {
        let p = rng.random_range(0..processor_count);
        schedule.assign(job, p)?;
    }
    Ok(schedule)
}

/// All jobs on processor 0 — a deliberately bad starting point, used as a
/// stress seed so improvements are easy to measure.
pub fn worst_case(job_count: usize, processor_count: usize, durations: Arc<[f64]>) -> PsaResult<Schedule> {
    let mut schedule = Schedule::new(job_count, processor_count, durations)?;
    for job in 0..job_count {
        schedule.assign(job, 0)?;
    }
    Ok(schedule)
}

/// LPT heuristic: sort jobs by duration descending, repeatedly assign the
/// next job to the currently least-loaded processor.
pub fn balanced(job_count: usize, processor_count: usize, durations: Arc<[f64]>) -> PsaResult<Schedule> {
    let mut schedule = Schedule::new(job_count, processor_count, durations.clone())?;
    let mut order: Vec<usize> = (0..job_count).collect();
    order.sort_by(|&a, &b| durations[b].partial_cmp(&durations[a]).unwrap());
    let mut loads = vec![0.0_f64; processor_count];
    for job in order {
        let target = loads
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| idx)
            .expect("processor_count >= 1");
        schedule.assign(job, target)?;
        loads[target] += durations[job];
    }
    Ok(schedule)
}
