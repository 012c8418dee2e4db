//! Benchmarks for one control step of the pendulum controller

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fuzzy_control::config::EngineConfig;
use fuzzy_control::Inputs;

fn pendulum() -> EngineConfig {
    EngineConfig::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pendulum.toml"))
        .expect("pendulum fixture")
}

fn control_step_benchmark(c: &mut Criterion) {
    let engine = pendulum().build().expect("valid pendulum configuration");
    let states = [
        ("balanced", [0., 0., 0., 0.]),
        ("tilted", [7., -1.2, 0.1, 0.05]),
        ("saturated", [28., 5.5, -0.35, -0.9]),
    ];

    let mut group = c.benchmark_group("control_step");

    for (name, [angle, angular_velocity, cart_position, cart_velocity]) in states {
        let inputs = Inputs::from([
            ("angle", angle),
            ("angularVelocity", angular_velocity),
            ("cartPosition", cart_position),
            ("cartVelocity", cart_velocity),
        ]);

        group.bench_with_input(BenchmarkId::new("eval", name), &inputs, |b, inputs| {
            b.iter(|| black_box(engine.eval(black_box(inputs)).map(|out| out.value())));
        });
    }

    group.finish();
}

fn build_benchmark(c: &mut Criterion) {
    let config = pendulum();

    c.bench_function("build_pendulum", |b| {
        b.iter(|| black_box(config.build().map(|engine| engine.max_cost())));
    });
}

fn step_size_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_step");
    let inputs = Inputs::from([
        ("angle", 7.),
        ("angularVelocity", -1.2),
        ("cartPosition", 0.1),
        ("cartVelocity", 0.05),
    ]);

    for step in [2.0, 0.5, 0.1] {
        let mut config = pendulum();
        config.output.universe.step = step;
        let engine = config.build().expect("valid pendulum configuration");

        group.bench_with_input(BenchmarkId::from_parameter(step), &inputs, |b, inputs| {
            b.iter(|| black_box(engine.compute(black_box(inputs)).ok()));
        });
    }

    group.finish();
}

criterion_group!(benches, control_step_benchmark, build_benchmark, step_size_benchmark);
criterion_main!(benches);
