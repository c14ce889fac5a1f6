use std::fs;
use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, Criterion};

use duplicate_finder_core::engine::disk::merge::cascading_merge;

fn make_run_files(dir: &std::path::Path, count: u32, records_per_file: u32) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for i in 0..count {
        let mut lines = Vec::with_capacity(records_per_file as usize);
        for r in 0..records_per_file {
            let hash = (i as u64) * (records_per_file as u64) + r as u64;
            lines.push(format!("{:016x}\t0\tline-{hash}", hash));
        }
        let path = dir.join(format!("run_{i}.tmp"));
        fs::write(&path, lines.join("\n") + "\n").unwrap();
        paths.push(path);
    }
    paths
}

fn bench_cascading_merge(c: &mut Criterion) {
    c.bench_function("cascading_merge 64 runs, batch 16", |b| {
        b.iter_batched(
            || {
                let dir = tempfile::tempdir().unwrap();
                let paths = make_run_files(dir.path(), 64, 200);
                (dir, paths)
            },
            |(dir, paths)| {
                cascading_merge(paths, dir.path(), 16).unwrap();
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_cascading_merge);
criterion_main!(benches);
