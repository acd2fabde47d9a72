use criterion::{black_box, criterion_group, criterion_main, Criterion};

use countdown_reward::equation::evaluate;
use countdown_reward::model::GroundTruth;
use countdown_reward::score::{NoopSampler, Scorer};

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    group.bench_function("flat", |b| b.iter(|| evaluate(black_box("3+5*2-4/2"))));

    group.bench_function("nested_parens", |b| {
        b.iter(|| evaluate(black_box("((1+2)*(3+4)-(5-6))/(7-(8/9))")))
    });

    group.bench_function("gate_rejection", |b| {
        b.iter(|| evaluate(black_box("3+5; import os")))
    });

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let scorer = Scorer::default().with_sampler(NoopSampler);
    let gt = GroundTruth::new(8.0, vec![3, 5]);

    group.bench_function("correct", |b| {
        let text = "Assistant: adding them up <answer>3+5</answer>";
        b.iter(|| scorer.score(black_box(text), black_box(&gt)))
    });

    group.bench_function("extraction_miss", |b| {
        let text = "no marker anywhere in this transcript";
        b.iter(|| scorer.score(black_box(text), black_box(&gt)))
    });

    group.bench_function("invalid_numbers", |b| {
        let text = "Assistant: <answer>3+5+2</answer>";
        b.iter(|| scorer.score(black_box(text), black_box(&gt)))
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_score);
criterion_main!(benches);
