use criterion::{black_box, criterion_group, criterion_main, Criterion};

use interactome::{EvidenceSet, FusedInteractions, IdentifierMap, InteractionRecord, ProteinPair};

const PROTEINS: usize = 2000;

fn records(n: usize) -> Vec<InteractionRecord> {
    (0..n)
        .map(|i| {
            let line = format!(
                "9606.P{} 9606.P{} 0 0 0 0 0 0 0 {}",
                i % PROTEINS,
                (i * 7 + 1) % PROTEINS,
                i % 1000
            );
            InteractionRecord::try_from(line.as_str()).unwrap()
        })
        .collect()
}

fn identifiers() -> IdentifierMap {
    let mut ids = IdentifierMap::default();
    for i in 0..PROTEINS {
        ids.insert(&format!("9606.P{i}"), &i.to_string());
    }
    ids
}

fn sources() -> Vec<EvidenceSet> {
    [("HI-II-14", 0.95, 2), ("Venkatesan-09", 0.85, 3), ("Yu-11", 0.85, 5), ("Lit-BM-13", 0.9, 11)]
        .into_iter()
        .map(|(name, weight, step)| {
            let mut set = EvidenceSet::new(name, weight);
            for i in (0..PROTEINS).step_by(step) {
                let a = i.to_string();
                let b = ((i * 7 + 1) % PROTEINS).to_string();
                set.insert(ProteinPair::new(&a, &b));
            }
            set
        })
        .collect()
}

fn fusion_benchmark(c: &mut Criterion) {
    let records = records(50_000);
    let ids = identifiers();
    let sources = sources();

    c.bench_function("fuse 50000 records", |b| {
        b.iter(|| {
            FusedInteractions::build(black_box(&records), black_box(&ids), black_box(&sources))
                .unwrap()
                .len()
        })
    });
}

criterion_group!(fusion, fusion_benchmark);
criterion_main!(fusion);
