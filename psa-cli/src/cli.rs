//! Command-line surface: eleven positional arguments plus an optional
//! trailing `log` flag, in the exact order the reference tooling expects.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "psa",
    about = "Parallel simulated-annealing job-to-processor scheduler"
)]
pub struct Args {
    /// Number of jobs to generate.
    pub jobs: usize,
    /// Number of processors to schedule onto.
    pub processors: usize,
    /// Minimum synthetic job duration.
    pub min_duration: f64,
    /// Maximum synthetic job duration.
    pub max_duration: f64,
    /// Coordinator exchange interval (cycles between reduce/broadcast).
    pub exchange_interval: u64,
    /// Initial annealing temperature T0.
    pub initial_temperature: f64,
    /// One of: boltzmann, cauchy, logarithmic.
    pub cooling_law: String,
    /// Inner iterations per temperature (K_in).
    pub iterations_per_temperature: u64,
    /// Per-worker outer-loop budget without improvement (N_ni).
    pub iterations_without_improvement: u64,
    /// Coordinator-level budget without improvement (N_ng).
    pub iterations_without_improvement_global: u64,
    /// Worker thread count; `<= 0` uses hardware parallelism.
    pub num_threads: i64,
    /// Optional trailing token "log" to enable the logger sink.
    pub log: Option<String>,
}

impl Args {
    pub fn logging_enabled(&self) -> bool {
        matches!(self.log.as_deref(), Some("log"))
    }
}
