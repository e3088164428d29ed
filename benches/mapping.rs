use criterion::{criterion_group, criterion_main, Criterion};
use pbsub::libs::phylo::{Outgroup, OutgroupPolicy, Tree};
use pbsub::libs::subst::{single, triplet};
use std::hint::black_box;

const WINDOW_FILES: [&str; 3] = [
    "tests/pbsub/gtr_0.map",
    "tests/pbsub/gtr_1.map",
    "tests/pbsub/gtr_2.map",
];

fn first_line(path: &str) -> String {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string()
}

fn mapping_parsing(c: &mut Criterion) {
    let line = first_line("tests/pbsub/single_0.map");
    c.bench_function("parse single", |b| {
        b.iter(|| Tree::from_mapping(black_box(&line)).unwrap());
    });

    let line = first_line(WINDOW_FILES[0]);
    let outgroup = Outgroup::new(["bushbaby"], OutgroupPolicy::Strict);
    c.bench_function("parse and prune", |b| {
        b.iter(|| Tree::from_mapping_with_outgroup(black_box(&line), Some(&outgroup)).unwrap());
    });
}

fn branch_summaries(c: &mut Criterion) {
    let tree = Tree::from_mapping(&first_line("tests/pbsub/single_0.map")).unwrap();
    c.bench_function("summarize single", |b| {
        b.iter(|| single::summarize(black_box(&tree)).unwrap());
    });

    let trees: Vec<Tree> = WINDOW_FILES
        .iter()
        .map(|path| Tree::from_mapping(&first_line(path)).unwrap())
        .collect();
    c.bench_function("summarize triplet", |b| {
        b.iter(|| triplet::summarize(black_box([&trees[0], &trees[1], &trees[2]])).unwrap());
    });
}

criterion_group!(benches, mapping_parsing, branch_summaries);
criterion_main!(benches);
