//! End-to-end scenario tests mirroring the literal input/output pairs used
//! to validate the engine during development.

use psa_core::cooling::{BoltzmannCooling, CauchyCooling, CoolingLaw};
use psa_core::coordinator::Coordinator;
use psa_core::generator;
use psa_core::mutation::ScheduleMutation;

#[test]
fn s1_single_job_single_processor() {
    let seed = generator::worst_case(1, 1, vec![5.0].into()).unwrap();
    assert_eq!(seed.evaluate(), 0.0);

    let mut c = Coordinator::new();
    c.set_seed(seed)
        .set_mutation(Box::new(ScheduleMutation::with_default_probability(1)))
        .set_cooling_law(Box::new(CauchyCooling::default()))
        .set_initial_temperature(100.0)
        .set_iterations_per_temperature(5)
        .set_max_iterations_without_improvement(5)
        .set_num_threads(1)
        .set_exchange_interval(1)
        .set_max_iterations_without_improvement_global(2);
    let best = c.run().unwrap();
    assert_eq!(best.evaluate(), 0.0);
}

#[test]
fn s2_two_equal_jobs_worst_case_then_improved() {
    let seed = generator::worst_case(2, 2, vec![10.0, 10.0].into()).unwrap();
    assert_eq!(seed.evaluate(), 10.0);

    let mut c = Coordinator::new();
    c.set_seed(seed)
        .set_mutation(Box::new(ScheduleMutation::with_default_probability(2)))
        .set_cooling_law(Box::new(CauchyCooling::default()))
        .set_initial_temperature(100.0)
        .set_iterations_per_temperature(20)
        .set_max_iterations_without_improvement(20)
        .set_num_threads(2)
        .set_exchange_interval(1)
        .set_max_iterations_without_improvement_global(3);
    let best = c.run().unwrap();
    assert_eq!(best.evaluate(), 0.0);
}

#[test]
fn s3_eight_jobs_three_processors_healthy_search() {
    let durations = vec![10.0, 15.0, 8.0, 12.0, 20.0, 5.0, 18.0, 9.0];
    let seed = generator::worst_case(8, 3, durations.into()).unwrap();
    assert_eq!(seed.evaluate(), 77.0);

    let mut c = Coordinator::new();
    c.set_seed(seed)
        .set_mutation(Box::new(ScheduleMutation::with_default_probability(3)))
        .set_cooling_law(Box::new(CauchyCooling::default()))
        .set_initial_temperature(1000.0)
        .set_iterations_per_temperature(50)
        .set_max_iterations_without_improvement(100)
        .set_num_threads(4)
        .set_exchange_interval(3)
        .set_max_iterations_without_improvement_global(10);
    let best = c.run().unwrap();
    assert!(best.evaluate() <= 20.0, "got {}", best.evaluate());
}

#[test]
fn s4_move_undefined_with_single_processor() {
    use psa_core::mutation::Mutation;
    let seed = generator::worst_case(3, 1, vec![1.0, 2.0, 3.0].into()).unwrap();
    let mut m = ScheduleMutation::new(1.0, 4).unwrap();
    assert!(m.apply(&seed).is_err());
}

#[test]
fn s6_boltzmann_literal_values() {
    let mut law = BoltzmannCooling::default();
    law.initialize(1000.0).unwrap();
    assert_eq!(law.cool(0).unwrap(), 1000.0);
    assert!((law.cool(1).unwrap() - 1442.6950).abs() < 1e-3);
    assert!((law.cool(2).unwrap() - 910.2392).abs() < 1e-3);
}

#[test]
fn coordinator_global_best_is_monotonic_non_increasing() {
    // Poll the coordinator handle from the calling thread while the search
    // runs on a second thread, and check the observed fitness sequence.
    use std::thread;
    use std::time::Duration;

    let durations = vec![10.0, 15.0, 8.0, 12.0, 20.0, 5.0, 18.0, 9.0];
    let seed = generator::worst_case(8, 3, durations.into()).unwrap();

    let mut c = Coordinator::new();
    c.set_seed(seed)
        .set_mutation(Box::new(ScheduleMutation::with_default_probability(5)))
        .set_cooling_law(Box::new(CauchyCooling::default()))
        .set_initial_temperature(1000.0)
        .set_iterations_per_temperature(30)
        .set_max_iterations_without_improvement(50)
        .set_num_threads(2)
        .set_exchange_interval(1)
        .set_max_iterations_without_improvement_global(5);

    let handle = c.handle();
    let join = thread::spawn(move || c.run());

    let mut last = f64::INFINITY;
    for _ in 0..50 {
        let f = handle.global_best_fitness();
        assert!(f <= last + 1e-9, "global best fitness increased: {f} > {last}");
        last = f;
        thread::sleep(Duration::from_millis(20));
    }

    join.join().unwrap().unwrap();
}
