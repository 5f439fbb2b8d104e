mod cli;
mod csv_io;
mod error;
mod logger;

use clap::Parser;
use cli::Args;
use error::{CliError, CliResult};
use indicatif::{ProgressBar, ProgressStyle};
use psa_core::cooling;
use psa_core::coordinator::Coordinator;
use psa_core::generator;
use psa_core::mutation::ScheduleMutation;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> CliResult<()> {
    validate(args)?;

    if args.logging_enabled() {
        logger::install("psa.log")?;
        log::info!("logging enabled for this run");
    }

    let csv_path = std::env::temp_dir().join(format!("psa-{}.csv", std::process::id()));
    csv_io::generate(
        &csv_path,
        args.processors as u32,
        args.jobs as u32,
        args.min_duration,
        args.max_duration,
    )?;
    let input = csv_io::read(&csv_path)?;
    debug_assert_eq!(input.job_durations.len(), args.jobs);

    let durations: Arc<[f64]> = input.job_durations.clone().into();
    let seed = generator::worst_case(args.jobs, args.processors, durations)?;
    println!("worst-case seed imbalance: {:.4}", seed.evaluate());

    let mut coordinator = Coordinator::new();
    coordinator
        .set_seed(seed)
        .set_mutation(Box::new(ScheduleMutation::with_default_probability(0)))
        .set_cooling_law(cooling::by_name(&args.cooling_law)?)
        .set_initial_temperature(args.initial_temperature)
        .set_iterations_per_temperature(args.iterations_per_temperature)
        .set_max_iterations_without_improvement(args.iterations_without_improvement)
        .set_num_threads(args.num_threads)
        .set_exchange_interval(args.exchange_interval)
        .set_max_iterations_without_improvement_global(args.iterations_without_improvement_global);

    let handle = coordinator.handle();
    let finished = Arc::new(AtomicBool::new(false));
    let poller_finished = finished.clone();
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {elapsed_precise} best imbalance: {msg}")
            .unwrap(),
    );
    let poller = thread::spawn(move || {
        while !poller_finished.load(Ordering::SeqCst) {
            bar.set_message(format!("{:.4}", handle.global_best_fitness()));
            bar.tick();
            thread::sleep(Duration::from_millis(100));
        }
        bar.finish_and_clear();
    });

    let best = coordinator.run()?;
    finished.store(true, Ordering::SeqCst);
    poller.join().expect("progress poller thread panicked");

    println!("final imbalance: {:.4}", best.evaluate());
    for p in 0..best.processor_count() {
        let jobs: Vec<usize> = (0..best.job_count())
            .filter(|&j| best.processor_of(j).unwrap() == p)
            .collect();
        println!("processor {p}: {jobs:?}");
    }

    let _ = std::fs::remove_file(&csv_path);
    Ok(())
}

fn validate(args: &Args) -> CliResult<()> {
    if args.jobs == 0 {
        return Err(CliError::InvalidArgument("jobs must be >= 1".into()));
    }
    if args.processors == 0 {
        return Err(CliError::InvalidArgument("processors must be >= 1".into()));
    }
    if args.min_duration <= 0.0 || args.max_duration < args.min_duration {
        return Err(CliError::InvalidArgument(format!(
            "invalid duration range [{}, {}]",
            args.min_duration, args.max_duration
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            jobs: 8,
            processors: 3,
            min_duration: 1.0,
            max_duration: 20.0,
            exchange_interval: 100,
            initial_temperature: 1000.0,
            cooling_law: "cauchy".into(),
            iterations_per_temperature: 50,
            iterations_without_improvement: 100,
            iterations_without_improvement_global: 10,
            num_threads: 4,
            log: None,
        }
    }

    #[test]
    fn accepts_well_formed_args() {
        assert!(validate(&base_args()).is_ok());
    }

    #[test]
    fn rejects_zero_jobs() {
        let mut args = base_args();
        args.jobs = 0;
        assert!(validate(&args).is_err());
    }

    #[test]
    fn rejects_inverted_duration_range() {
        let mut args = base_args();
        args.min_duration = 20.0;
        args.max_duration = 1.0;
        assert!(validate(&args).is_err());
    }

    #[test]
    fn trailing_log_token_enables_logging() {
        let mut args = base_args();
        assert!(!args.logging_enabled());
        args.log = Some("log".into());
        assert!(args.logging_enabled());
        args.log = Some("verbose".into());
        assert!(!args.logging_enabled());
    }
}
