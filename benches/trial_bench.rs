//! Benchmarks for the trial engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use betsim::games::baccarat::{type_switching, Baccarat};
use betsim::games::roulette::{Roulette, RouletteConfig, RouletteStrategy};
use betsim::sim::{trial_rng, SimConfig, Simulation, TrialRunner};

fn baccarat_single_trial_benchmark(c: &mut Criterion) {
    let game = Baccarat::default();
    let config = SimConfig::default().with_table_limit(1_000).with_history(false);
    let plan = type_switching(100);
    let mut trial = 0u64;

    c.bench_function("baccarat_single_trial", |b| {
        b.iter(|| {
            trial += 1;
            let mut rng = trial_rng(42, trial);
            let runner = TrialRunner::new(&game, &config, plan.clone(), trial, &mut rng);
            black_box(runner.run(&mut rng))
        })
    });
}

fn roulette_1000_trials_benchmark(c: &mut Criterion) {
    let preset = RouletteStrategy::ThirdsProgression;
    let game = Roulette::new(RouletteConfig::default().with_pay_table(preset.pay_table()));
    let config = SimConfig::default()
        .with_trials(1_000)
        .with_starting_balance(10_000)
        .with_seed(42)
        .with_history(false);
    let sim = Simulation::new(game, config, preset.plan(preset.default_unit()));

    c.bench_function("roulette_1000_trials", |b| {
        b.iter(|| black_box(sim.run()))
    });
}

criterion_group!(benches, baccarat_single_trial_benchmark, roulette_1000_trials_benchmark);
criterion_main!(benches);
