//! # psa-core: Parallel Simulated-Annealing Scheduling Engine
//!
//! Searches for a near-optimal assignment of indivisible jobs to identical
//! parallel processors, minimizing the imbalance objective `f = max_j L_j -
//! min_j M_j` (maximum processor load minus the largest single job duration
//! among non-empty processors).
//!
//! The engine is built from small, independently testable pieces:
//! - [`cooling`]: stateless temperature schedules (Boltzmann, Cauchy, logarithmic-decay).
//! - [`schedule`]: the `Schedule` value object and the imbalance objective.
//! - [`mutation`]: the Move/Swap neighborhood operator.
//! - [`generator`]: seed schedule constructors (random, worst-case, LPT-balanced).
//! - [`worker`]: a single-threaded Metropolis loop.
//! - [`coordinator`]: N workers on their own OS threads, reduced and broadcast from the caller's thread.
//!
//! ## Quick example
//!
//! ```no_run
//! use psa_core::{coordinator::Coordinator, cooling::CauchyCooling, generator, mutation::ScheduleMutation};
//!
//! let durations: Vec<f64> = vec![10.0, 15.0, 8.0, 12.0, 20.0, 5.0, 18.0, 9.0];
//! let seed = generator::worst_case(durations.len(), 3, durations.into()).unwrap();
//!
//! let mut coordinator = Coordinator::new();
//! coordinator
//!     .set_seed(seed)
//!     .set_mutation(Box::new(ScheduleMutation::with_default_probability(0)))
//!     .set_cooling_law(Box::new(CauchyCooling::default()))
//!     .set_initial_temperature(1000.0)
//!     .set_iterations_per_temperature(50)
//!     .set_max_iterations_without_improvement(100)
//!     .set_num_threads(4)
//!     .set_exchange_interval(100)
//!     .set_max_iterations_without_improvement_global(10);
//!
//! let best = coordinator.run().unwrap();
//! println!("final imbalance: {}", best.evaluate());
//! ```

pub mod cooling;
pub mod coordinator;
pub mod error;
pub mod generator;
pub mod mutation;
pub mod schedule;
pub mod worker;

pub use coordinator::Coordinator;
pub use error::{PsaError, PsaResult};
pub use schedule::Schedule;
