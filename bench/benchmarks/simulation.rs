use criterion::Criterion;
use hammer_dance::{Params, Simulation, SirModel, SirState, TransmissionRates};
use std::hint::black_box;

pub fn sir_model_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("sir_model");
    let model = SirModel::new(
        10_000.0,
        0.1,
        TransmissionRates {
            hammer: 0.1,
            dance: 0.5,
        },
    );
    let state = SirState::new(9000.0, 900.0, 100.0);

    group.bench_function("derivatives", |b| {
        b.iter(|| {
            black_box(model.derivatives(black_box(&state), black_box(0.5)));
        });
    });

    group.bench_function("euler_step", |b| {
        b.iter(|| {
            black_box(model.step(black_box(&state), black_box(0.5), black_box(0.1)));
        });
    });

    group.finish();
}

pub fn simulation_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");

    // 10,950 steps with periodic phase switching
    let default_params = Params::default();
    group.bench_function("default_scenario", |b| {
        b.iter(|| {
            let simulation = Simulation::new(black_box(&default_params))
                .expect("Default parameters are valid");
            black_box(simulation.run());
        });
    });

    let small_params = Params {
        population: 1000.0,
        initial_infected: 10.0,
        initial_recovered: 0.0,
        beta_hammer: 0.1,
        beta_dance: 0.5,
        gamma: 0.1,
        max_days: 200.0,
        hammer_threshold: 50.0,
        dance_threshold: 20.0,
        dt: 1.0,
        ..Default::default()
    };
    group.bench_function("small_scenario", |b| {
        b.iter(|| {
            let simulation =
                Simulation::new(black_box(&small_params)).expect("Small parameters are valid");
            black_box(simulation.run());
        });
    });

    group.finish();
}
