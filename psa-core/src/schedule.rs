//! The `Schedule` value object: a total assignment of jobs to processors.
//!
//! A `Schedule` owns no algorithm state. It is produced by the generators in
//! [`crate::generator`] or by cloning inside [`crate::mutation`], consumed by
//! [`crate::worker`] and [`crate::coordinator`], and never mutated after it
//! has been published across a thread boundary — every publication point is a
//! deep [`Schedule::clone`].

use crate::error::{PsaError, PsaResult};
use std::sync::Arc;

/// A total assignment of `J` jobs to `P` identical processors, together with
/// the (shared, immutable) job durations it was built against.
///
/// The external invariant is: every job index in `[0, J)` has an assigned
/// processor index in `[0, P)`. Internally this is a flat `Vec<usize>`
/// (canonical form per the data model); a `J×P` boolean matrix would be
/// equivalent but strictly more expensive to evaluate and clone.
#[derive(Debug, Clone)]
pub struct Schedule {
    durations: Arc<[f64]>,
    processor_count: usize,
    assignment: Vec<usize>,
}

impl Schedule {
    /// Builds a new schedule with an unspecified initial assignment.
    ///
    /// Every job starts assigned to processor `0`; callers that need a
    /// specific seed assignment should use [`crate::generator`] instead of
    /// relying on this default. `evaluate` is well-defined immediately
    /// because every job does have *some* assigned processor, even if that
    /// initial assignment is arbitrary.
    pub fn new(job_count: usize, processor_count: usize, durations: Arc<[f64]>) -> PsaResult<Self> {
        if job_count == 0 {
            return Err(PsaError::InvalidArgument("job_count must be >= 1".into()));
        }
        if processor_count == 0 {
            return Err(PsaError::InvalidArgument(
                "processor_count must be >= 1".into(),
            ));
        }
        if durations.len() != job_count {
            return Err(PsaError::InvalidArgument(format!(
                "durations length {} does not match job_count {}",
                durations.len(),
                job_count
            )));
        }
        if durations.iter().any(|d| !(*d > 0.0)) {
            return Err(PsaError::InvalidArgument(
                "all job durations must be strictly positive".into(),
            ));
        }
        Ok(Self {
            durations,
            processor_count,
            assignment: vec![0; job_count],
        })
    }

    pub fn job_count(&self) -> usize {
        self.assignment.len()
    }

    pub fn processor_count(&self) -> usize {
        self.processor_count
    }

    pub fn duration(&self, job: usize) -> f64 {
        self.durations[job]
    }

    pub fn durations(&self) -> &Arc<[f64]> {
        &self.durations
    }

    /// Reassigns `job` to `processor`, replacing any prior assignment.
    pub fn assign(&mut self, job: usize, processor: usize) -> PsaResult<()> {
        if job >= self.job_count() {
            return Err(PsaError::OutOfRange(format!(
                "job index {} out of range [0, {})",
                job,
                self.job_count()
            )));
        }
        if processor >= self.processor_count {
            return Err(PsaError::OutOfRange(format!(
                "processor index {} out of range [0, {})",
                processor, self.processor_count
            )));
        }
        self.assignment[job] = processor;
        Ok(())
    }

    /// Returns the processor job `i` is assigned to.
    pub fn processor_of(&self, job: usize) -> PsaResult<usize> {
        self.assignment
            .get(job)
            .copied()
            .ok_or_else(|| PsaError::Invariant(format!("job {job} has no recorded processor")))
    }

    /// Computes `f = max_j L_j - min_j M_j`, the imbalance objective.
    ///
    /// `L_j` is processor `j`'s total load; `M_j` is the largest single job
    /// duration assigned to it. Empty processors contribute to neither the
    /// max-load term nor the min-largest-job term. `O(J + P)`, recomputed
    /// from scratch every call.
    pub fn evaluate(&self) -> f64 {
        let mut loads = vec![0.0_f64; self.processor_count];
        let mut largest = vec![None::<f64>; self.processor_count];
        for (job, &proc) in self.assignment.iter().enumerate() {
            let d = self.durations[job];
            loads[proc] += d;
            largest[proc] = Some(largest[proc].map_or(d, |m: f64| m.max(d)));
        }
        let max_load = loads.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_largest = largest
            .iter()
            .flatten()
            .cloned()
            .fold(f64::INFINITY, f64::min);
        max_load - min_largest
    }
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.processor_count == other.processor_count && self.assignment == other.assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn durations(ds: &[f64]) -> Arc<[f64]> {
        ds.to_vec().into()
    }

    #[test]
    fn rejects_zero_counts_and_length_mismatch() {
        assert!(Schedule::new(0, 1, durations(&[])).is_err());
        assert!(Schedule::new(1, 0, durations(&[1.0])).is_err());
        assert!(Schedule::new(2, 1, durations(&[1.0])).is_err());
        assert!(Schedule::new(1, 1, durations(&[0.0])).is_err());
    }

    #[test]
    fn single_job_single_processor_is_balanced() {
        let mut s = Schedule::new(1, 1, durations(&[5.0])).unwrap();
        s.assign(0, 0).unwrap();
        assert_eq!(s.evaluate(), 0.0);
    }

    #[test]
    fn worst_case_two_equal_jobs_on_one_processor() {
        let mut s = Schedule::new(2, 2, durations(&[10.0, 10.0])).unwrap();
        s.assign(0, 0).unwrap();
        s.assign(1, 0).unwrap();
        assert_eq!(s.evaluate(), 10.0);
        s.assign(1, 1).unwrap();
        assert_eq!(s.evaluate(), 0.0);
    }

    #[test]
    fn assign_out_of_range_fails() {
        let mut s = Schedule::new(1, 1, durations(&[1.0])).unwrap();
        assert!(matches!(s.assign(5, 0), Err(PsaError::OutOfRange(_))));
        assert!(matches!(s.assign(0, 5), Err(PsaError::OutOfRange(_))));
    }

    #[test]
    fn evaluate_is_deterministic_and_clone_preserving() {
        let mut s = Schedule::new(3, 2, durations(&[4.0, 2.0, 9.0])).unwrap();
        s.assign(0, 0).unwrap();
        s.assign(1, 1).unwrap();
        s.assign(2, 0).unwrap();
        let f1 = s.evaluate();
        let f2 = s.evaluate();
        let f3 = s.clone().evaluate();
        assert_eq!(f1, f2);
        assert_eq!(f1, f3);
    }
}
