use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use sim_core::{RunConfig, SeededSource};
use sim_events::EventCatalog;

fn bench_ticks(c: &mut Criterion) {
    let catalog = EventCatalog::builtin().unwrap();
    let cfg = RunConfig {
        months: u32::MAX,
        population_size: 1_000,
        ..RunConfig::default()
    };
    let mut world = sim_runtime::init_world(
        cfg.clone(),
        catalog.clone(),
        Box::new(SeededSource::new(cfg.seed)),
    )
    .unwrap();
    c.bench_function("sim_tick", |b| {
        b.iter(|| {
            let _ = sim_runtime::run_months_in_place(&mut world, 1);
        })
    });

    let five_years = RunConfig {
        months: 60,
        ..RunConfig::default()
    };
    c.bench_function("sim_five_years", |b| {
        b.iter_batched(
            || sim_runtime::Simulation::new(five_years.clone(), catalog.clone()).unwrap(),
            |sim| sim.run(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
