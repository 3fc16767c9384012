use criterion::{criterion_group, criterion_main, Criterion};
use regroup::{group_by, GroupByConfig};

fn make_pairs(rows: usize) -> Vec<(i64, i64)> {
    (0..rows)
        .map(|i| ((i as i64 * 3) % 101, i as i64 % 7))
        .collect()
}

fn bench_in_memory(c: &mut Criterion) {
    let pairs = make_pairs(10_000);
    let root = tempfile::tempdir().unwrap();
    let config = GroupByConfig {
        workspace_root: root.path().to_path_buf(),
        ..GroupByConfig::default()
    };
    c.bench_function("group_by_in_memory_10k", |b| {
        b.iter(|| {
            let groups = group_by(pairs.clone(), config.clone())
                .unwrap()
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            groups.len()
        })
    });
}

fn bench_spilled(c: &mut Criterion) {
    let pairs = make_pairs(10_000);
    let root = tempfile::tempdir().unwrap();
    let config = GroupByConfig {
        max_num_files: 4,
        max_hashmap_entries: 1_000,
        workspace_root: root.path().to_path_buf(),
        ..GroupByConfig::default()
    };
    c.bench_function("group_by_spilled_10k", |b| {
        b.iter(|| {
            let groups = group_by(pairs.clone(), config.clone())
                .unwrap()
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            groups.len()
        })
    });
}

criterion_group!(benches, bench_in_memory, bench_spilled);
criterion_main!(benches);
