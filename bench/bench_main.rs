use criterion::{criterion_group, criterion_main};

mod benchmarks;
use benchmarks::simulation::{simulation_benchmarks, sir_model_benchmarks};

criterion_group!(hammer_dance_benches, sir_model_benchmarks, simulation_benchmarks,);

criterion_main!(hammer_dance_benches);
