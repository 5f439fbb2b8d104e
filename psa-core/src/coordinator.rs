//! The parallel coordinator: spawns `N` [`SaWorker`] threads, periodically
//! reduces their best schedules into a single global best, and broadcasts
//! improvements back down.

use crate::cooling::CoolingLaw;
use crate::error::{PsaError, PsaResult};
use crate::mutation::{seed_from_clock, Mutation};
use crate::schedule::Schedule;
use crate::worker::{SaWorker, WorkerHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const EXCHANGE_QUANTUM: Duration = Duration::from_millis(50);
const LIVENESS_PROBE_CYCLES: u64 = 10;

struct GlobalBest {
    schedule: Schedule,
    fitness: f64,
}

/// A thread-safe reference to the coordinator's published global best,
/// independent of the thread that is blocked inside `run()`. Used by the CLI
/// progress poller and by external callers that want to `stop()` a run from
/// another thread.
#[derive(Clone)]
pub struct CoordinatorHandle {
    global: Arc<Mutex<GlobalBest>>,
    stop_flag: Arc<AtomicBool>,
}

impl CoordinatorHandle {
    pub fn global_best_fitness(&self) -> f64 {
        self.global.lock().unwrap().fitness
    }

    pub fn global_best(&self) -> Schedule {
        self.global.lock().unwrap().schedule.clone()
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

/// Parallel coordinator: spawns and supervises worker threads. `run()` fails
/// with [`PsaError::NotInitialized`] if the seed schedule, mutation, or
/// cooling law template were never set.
pub struct Coordinator {
    handle: CoordinatorHandle,
    seed: Option<Schedule>,
    mutation: Option<Box<dyn Mutation>>,
    cooling_law: Option<Box<dyn CoolingLaw>>,
    t0: Option<f64>,
    iterations_per_temperature: u64,
    max_no_improve_worker: u64,
    num_threads: i64,
    exchange_interval: u64,
    max_no_improve_global: u64,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            handle: CoordinatorHandle {
                global: Arc::new(Mutex::new(GlobalBest {
                    schedule: Schedule::new(1, 1, vec![1.0].into())
                        .expect("1x1 placeholder schedule is always valid"),
                    fitness: f64::INFINITY,
                })),
                stop_flag: Arc::new(AtomicBool::new(false)),
            },
            seed: None,
            mutation: None,
            cooling_law: None,
            t0: None,
            iterations_per_temperature: 1,
            max_no_improve_worker: 0,
            num_threads: 1,
            exchange_interval: 100,
            max_no_improve_global: 10,
        }
    }

    pub fn set_seed(&mut self, seed: Schedule) -> &mut Self {
        self.seed = Some(seed);
        self
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
        self.max_no_improve_worker = n_ni;
        self
    }

    /// `N <= 0` means "use hardware parallelism, floor 1".
    pub fn set_num_threads(&mut self, n: i64) -> &mut Self {
        self.num_threads = n;
        self
    }

    pub fn set_exchange_interval(&mut self, e: u64) -> &mut Self {
        self.exchange_interval = e.max(1);
        self
    }

    pub fn set_max_iterations_without_improvement_global(&mut self, n_ng: u64) -> &mut Self {
        self.max_no_improve_global = n_ng;
        self
    }

    /// A cloneable reference usable from another thread to poll progress or
    /// request cancellation while `run()` is blocked on the calling thread.
    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    fn resolved_thread_count(&self) -> usize {
        if self.num_threads > 0 {
            self.num_threads as usize
        } else {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }

    /// Spawns `N` workers, runs the exchange loop on the calling thread, and
    /// returns the global best schedule found across all workers.
    pub fn run(&mut self) -> PsaResult<Schedule> {
        let seed = self
            .seed
            .take()
            .ok_or_else(|| PsaError::NotInitialized("seed schedule was never set".into()))?;
        let mutation_template = self
            .mutation
            .take()
            .ok_or_else(|| PsaError::NotInitialized("mutation was never set".into()))?;
        let cooling_template = self
            .cooling_law
            .take()
            .ok_or_else(|| PsaError::NotInitialized("cooling law was never set".into()))?;
        let t0 = self
            .t0
            .ok_or_else(|| PsaError::NotInitialized("initial temperature was never set".into()))?;

        {
            let mut global = self.handle.global.lock().unwrap();
            global.fitness = seed.evaluate();
            global.schedule = seed.clone();
        }

        let n = self.resolved_thread_count();
        log::info!(
            "coordinator starting: N={n} T0={t0} K_in={} N_ni={} E={} N_ng={}",
            self.iterations_per_temperature,
            self.max_no_improve_worker,
            self.exchange_interval,
            self.max_no_improve_global
        );

        let start = Instant::now();
        let mut handles: Vec<WorkerHandle> = Vec::with_capacity(n);
        let mut joins: Vec<JoinHandle<PsaResult<Schedule>>> = Vec::with_capacity(n);

        for i in 0..n {
            let mut worker = SaWorker::new(seed.clone(), i as u64);
            let mut mutation = mutation_template.clone();
            mutation.reseed(seed_from_clock(i as u64));
            worker
                .set_mutation(mutation)
                .set_cooling_law(cooling_template.clone())
                .set_initial_temperature(t0)
                .set_iterations_per_temperature(self.iterations_per_temperature)
                .set_max_iterations_without_improvement(self.max_no_improve_worker);
            handles.push(worker.handle());
            joins.push(thread::spawn(move || worker.run()));
        }

        let mut no_imp_global: u64 = 0;
        let mut cycle: u64 = 0;

        loop {
            thread::sleep(EXCHANGE_QUANTUM);
            cycle += 1;

            if self.handle.stop_flag.load(Ordering::SeqCst) {
                log::info!("coordinator stop requested at cycle {cycle}");
                break;
            }

            if cycle % self.exchange_interval == 0 {
                let improved = self.reduce_and_broadcast(&handles);
                if improved {
                    no_imp_global = 0;
                } else {
                    no_imp_global += 1;
                }
                if no_imp_global >= self.max_no_improve_global {
                    log::info!("coordinator reached N_ng={} at cycle {cycle}", self.max_no_improve_global);
                    break;
                }
            }

            if cycle % LIVENESS_PROBE_CYCLES == 0 && !handles.iter().any(WorkerHandle::is_running) {
                log::info!("coordinator observed all workers finished at cycle {cycle}");
                break;
            }
        }

        self.shutdown(&handles, joins);
        self.reduce_and_broadcast(&handles);

        let global = self.handle.global.lock().unwrap();
        log::info!(
            "coordinator finished: fitness={:.4} elapsed={:.2}s",
            global.fitness,
            start.elapsed().as_secs_f64()
        );
        Ok(global.schedule.clone())
    }

    /// Snapshots every worker's best under its own lock, updates the global
    /// best under the coordinator's lock if strictly improved, and
    /// broadcasts the (possibly unchanged) global best back to every worker.
    /// Lock order is always worker-then-coordinator, matching the locking
    /// discipline that rules out deadlock between the two lock kinds.
    fn reduce_and_broadcast(&self, handles: &[WorkerHandle]) -> bool {
        let mut improved = false;
        {
            let mut global = self.handle.global.lock().unwrap();
            for h in handles {
                let f = h.best_fitness();
                if f < global.fitness {
                    global.fitness = f;
                    global.schedule = h.best();
                    improved = true;
                }
            }
        }
        if improved {
            let global_best = self.handle.global.lock().unwrap().schedule.clone();
            for h in handles {
                h.set_current(global_best.clone());
            }
            log::info!("global best improved to {:.4}", self.handle.global.lock().unwrap().fitness);
        }
        improved
    }

    fn shutdown(&self, handles: &[WorkerHandle], joins: Vec<JoinHandle<PsaResult<Schedule>>>) {
        for h in handles {
            h.stop();
        }
        for j in joins {
            if let Err(e) = j.join() {
                log::warn!("worker thread panicked: {e:?}");
            }
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooling::CauchyCooling;
    use crate::generator;
    use crate::mutation::ScheduleMutation;

    #[test]
    fn unconfigured_coordinator_fails_not_initialized() {
        let mut c = Coordinator::new();
        assert!(matches!(c.run(), Err(PsaError::NotInitialized(_))));
    }

    #[test]
    fn scenario_s3_parallel_search_reaches_target() {
        let durations: Vec<f64> = vec![10.0, 15.0, 8.0, 12.0, 20.0, 5.0, 18.0, 9.0];
        let seed = generator::worst_case(8, 3, durations.into()).unwrap();
        assert_eq!(seed.evaluate(), 77.0);

        let mut c = Coordinator::new();
        c.set_seed(seed)
            .set_mutation(Box::new(ScheduleMutation::with_default_probability(7)))
            .set_cooling_law(Box::new(CauchyCooling::default()))
            .set_initial_temperature(1000.0)
            .set_iterations_per_temperature(50)
            .set_max_iterations_without_improvement(100)
            .set_num_threads(4)
            .set_exchange_interval(2)
            .set_max_iterations_without_improvement_global(5);

        let best = c.run().unwrap();
        assert!(best.evaluate() <= 20.0, "got {}", best.evaluate());
    }

    #[test]
    fn stop_returns_promptly() {
        let seed = generator::worst_case(10, 3, vec![1.0; 10].into()).unwrap();
        let mut c = Coordinator::new();
        c.set_seed(seed)
            .set_mutation(Box::new(ScheduleMutation::with_default_probability(3)))
            .set_cooling_law(Box::new(CauchyCooling::default()))
            .set_initial_temperature(500.0)
            .set_iterations_per_temperature(1_000_000)
            .set_max_iterations_without_improvement(1_000_000)
            .set_num_threads(2)
            .set_exchange_interval(1)
            .set_max_iterations_without_improvement_global(1_000_000);

        let handle = c.handle();
        let stopper = handle.clone();
        let join = thread::spawn(move || {
            thread::sleep(Duration::from_millis(120));
            stopper.stop();
        });
        let best = c.run().unwrap();
        join.join().unwrap();
        for j in 0..best.job_count() {
            assert!(best.processor_of(j).unwrap() < best.processor_count());
        }
    }
}
