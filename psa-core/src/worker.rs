//! The sequential simulated-annealing worker: a single Metropolis loop over
//! one `Schedule`, runnable standalone or as one of N threads under a
//! [`crate::coordinator::Coordinator`].

use crate::cooling::{CoolingLaw, TEMPERATURE_FLOOR};
use crate::error::{PsaError, PsaResult};
use crate::mutation::{seed_from_clock, Mutation};
use crate::schedule::Schedule;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const INNER_SLEEP: Duration = Duration::from_millis(10);

#[derive(Clone)]
struct WorkerSnapshot {
    current: Schedule,
    best: Schedule,
    best_fitness: f64,
}

/// A thread-safe, cloneable reference to a worker's published state.
///
/// Obtained via [`SaWorker::handle`] before the worker is moved onto its own
/// thread; the Coordinator keeps one of these per worker to snapshot
/// `(best, best_fitness)` and to push the global best back down.
#[derive(Clone)]
pub struct WorkerHandle {
    snapshot: Arc<Mutex<WorkerSnapshot>>,
    stop_flag: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl WorkerHandle {
    pub fn best_fitness(&self) -> f64 {
        self.snapshot.lock().unwrap().best_fitness
    }

    pub fn best(&self) -> Schedule {
        self.snapshot.lock().unwrap().best.clone()
    }

    pub fn current(&self) -> Schedule {
        self.snapshot.lock().unwrap().current.clone()
    }

    /// Injects a new current schedule from outside (the Coordinator
    /// broadcasting the global best). A one-way push: if the injected
    /// schedule's fitness is strictly better than the worker's local best,
    /// the local best is replaced too. A no-op broadcast (identical fitness)
    /// is accepted silently.
    pub fn set_current(&self, schedule: Schedule) {
        let fitness = schedule.evaluate();
        let mut snap = self.snapshot.lock().unwrap();
        snap.current = schedule.clone();
        if fitness < snap.best_fitness {
            snap.best = schedule;
            snap.best_fitness = fitness;
        }
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Sequential SA worker. `run()` fails with [`PsaError::NotInitialized`] if
/// mutation or cooling law were never set.
pub struct SaWorker {
    handle: WorkerHandle,
    mutation: Option<Box<dyn Mutation>>,
    cooling_law: Option<Box<dyn CoolingLaw>>,
    t0: Option<f64>,
    iterations_per_temperature: u64,
    max_no_improve: u64,
    rng: StdRng,
}

impl SaWorker {
    /// `worker_index` salts the RNG seed so sibling workers spawned at
    /// nearly the same instant still diverge.
    pub fn new(initial: Schedule, worker_index: u64) -> Self {
        let best_fitness = initial.evaluate();
        let snapshot = WorkerSnapshot {
            current: initial.clone(),
            best: initial,
            best_fitness,
        };
        Self {
            handle: WorkerHandle {
                snapshot: Arc::new(Mutex::new(snapshot)),
                stop_flag: Arc::new(AtomicBool::new(false)),
                running: Arc::new(AtomicBool::new(false)),
            },
            mutation: None,
            cooling_law: None,
            t0: None,
            iterations_per_temperature: 1,
            max_no_improve: 0,
            rng: StdRng::seed_from_u64(seed_from_clock(worker_index)),
        }
    }

    pub fn set_mutation(&mut self, mutation: Box<dyn Mutation>) -> &mut Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn set_cooling_law(&mut self, cooling_law: Box<dyn CoolingLaw>) -> &mut Self {
        self.cooling_law = Some(cooling_law);
        self
    }

    pub fn set_initial_temperature(&mut self, t0: f64) -> &mut Self {
        self.t0 = Some(t0);
        self
    }

    pub fn set_iterations_per_temperature(&mut self, k_in: u64) -> &mut Self {
        self.iterations_per_temperature = k_in;
        self
    }

    pub fn set_max_iterations_without_improvement(&mut self, n_ni: u64) -> &mut Self {
        self.max_no_improve = n_ni;
        self
    }

    /// A cloneable, `Send + Sync` reference to this worker's published
    /// state. Call this before moving the worker onto its thread.
    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    pub fn best_fitness(&self) -> f64 {
        self.handle.best_fitness()
    }

    pub fn best(&self) -> Schedule {
        self.handle.best()
    }

    pub fn current(&self) -> Schedule {
        self.handle.current()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn stop(&self) {
        self.handle.stop()
    }

    /// Runs the Metropolis loop to termination and returns the best schedule
    /// found. Consumes the worker (its mutation and cooling law are
    /// single-owner); retain a [`WorkerHandle`] beforehand to observe it.
    pub fn run(mut self) -> PsaResult<Schedule> {
        let mut mutation = self.mutation.take().ok_or_else(|| {
            PsaError::NotInitialized("mutation was never set".into())
        })?;
        let mut cooling_law = self.cooling_law.take().ok_or_else(|| {
            PsaError::NotInitialized("cooling law was never set".into())
        })?;
        let t0 = self
            .t0
            .ok_or_else(|| PsaError::NotInitialized("initial temperature was never set".into()))?;
        cooling_law.initialize(t0)?;

        self.handle.running.store(true, Ordering::SeqCst);
        let result = self.run_inner(&mut *mutation, &*cooling_law);
        self.handle.running.store(false, Ordering::SeqCst);
        result
    }

    fn run_inner(
        &mut self,
        mutation: &mut dyn Mutation,
        cooling_law: &dyn CoolingLaw,
    ) -> PsaResult<Schedule> {
        let mut current = self.handle.current();
        let mut best = self.handle.best();
        let mut best_f = self.handle.best_fitness();

        if self.max_no_improve == 0 {
            return Ok(best);
        }

        let mut k: u64 = 0;
        let mut no_imp: u64 = 0;
        let mut temperature = cooling_law.cool(0)?;

        loop {
            if self.handle.stop_flag.load(Ordering::SeqCst) {
                log::warn!("worker cancelled, returning best-so-far f={best_f}");
                return Ok(best);
            }
            if no_imp >= self.max_no_improve {
                break;
            }

            let mut improved = false;
            for _ in 0..self.iterations_per_temperature {
                if self.handle.stop_flag.load(Ordering::SeqCst) {
                    log::warn!("worker cancelled mid-cycle, returning best-so-far f={best_f}");
                    return Ok(best);
                }

                let candidate = match mutation.apply(&current) {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("mutation failed: {e}");
                        return Err(e);
                    }
                };
                let candidate_f = candidate.evaluate();
                let delta = candidate_f - current.evaluate();

                let accept = delta <= 0.0
                    || (temperature > 0.0 && self.rng.random::<f64>() < (-delta / temperature).exp());
                if accept {
                    current = candidate.clone();
                }
                if candidate_f < best_f {
                    best = candidate;
                    best_f = candidate_f;
                    improved = true;
                }
                k += 1;
            }

            no_imp = if improved { 0 } else { no_imp + 1 };
            temperature = cooling_law.cool(k)?;

            {
                let mut snap = self.handle.snapshot.lock().unwrap();
                if snap.best_fitness < best_f {
                    best = snap.best.clone();
                    best_f = snap.best_fitness;
                    current = snap.current.clone();
                }
                snap.current = current.clone();
                snap.best = best.clone();
                snap.best_fitness = best_f;
            }

            log::trace!("cycle k={k} T={temperature:.4} best_f={best_f:.4}");

            if temperature < TEMPERATURE_FLOOR {
                break;
            }

            thread::sleep(INNER_SLEEP);
        }

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooling::CauchyCooling;
    use crate::generator;
    use crate::mutation::ScheduleMutation;

    fn worker_with(
        durations: &[f64],
        processors: usize,
        t0: f64,
        k_in: u64,
        n_ni: u64,
    ) -> SaWorker {
        let seed = generator::worst_case(durations.len(), processors, durations.to_vec().into())
            .unwrap();
        let mut worker = SaWorker::new(seed, 0);
        worker
            .set_mutation(Box::new(ScheduleMutation::with_default_probability(1)))
            .set_cooling_law(Box::new(CauchyCooling::default()))
            .set_initial_temperature(t0)
            .set_iterations_per_temperature(k_in)
            .set_max_iterations_without_improvement(n_ni);
        worker
    }

    #[test]
    fn unconfigured_worker_fails_not_initialized() {
        let seed = generator::worst_case(2, 2, vec![1.0, 1.0].into()).unwrap();
        let worker = SaWorker::new(seed, 0);
        assert!(matches!(worker.run(), Err(PsaError::NotInitialized(_))));
    }

    #[test]
    fn zero_budget_short_circuits_to_initial_best() {
        let worker = worker_with(&[10.0, 10.0], 2, 100.0, 5, 0);
        let initial_f = worker.best_fitness();
        let result = worker.run().unwrap();
        assert_eq!(result.evaluate(), initial_f);
    }

    #[test]
    fn scenario_s3_healthy_search_reaches_target() {
        let worker = worker_with(
            &[10.0, 15.0, 8.0, 12.0, 20.0, 5.0, 18.0, 9.0],
            3,
            1000.0,
            50,
            100,
        );
        let best = worker.run().unwrap();
        assert!(best.evaluate() <= 20.0, "got {}", best.evaluate());
    }

    #[test]
    fn stop_returns_promptly_with_valid_schedule() {
        let worker = worker_with(&[1.0; 20], 4, 500.0, 10_000, 10_000);
        let handle = worker.handle();
        let stopper = handle.clone();
        let join = thread::spawn(move || worker.run());
        thread::sleep(Duration::from_millis(30));
        stopper.stop();
        let best = join.join().unwrap().unwrap();
        for j in 0..best.job_count() {
            assert!(best.processor_of(j).unwrap() < best.processor_count());
        }
    }
}
