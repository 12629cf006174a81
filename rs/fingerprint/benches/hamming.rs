use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fingerprint::Fingerprint;
use rand::Rng;

fn random_fingerprint(width: usize) -> Fingerprint {
    let mut rng = rand::thread_rng();
    Fingerprint::from_fn(width, |_| rng.gen::<bool>())
}

fn bench_hamming_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hamming Distance");
    for width in [
        64,
        96,  // simhash default
        256, // nilsimsa default
        1024,
        8192,
    ]
    .iter()
    {
        let a = random_fingerprint(*width);
        let b = random_fingerprint(*width);

        group.bench_with_input(BenchmarkId::new("limbs", *width), width, |bencher, _| {
            bencher.iter(|| black_box(&a).hamming_distance(black_box(&b)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hamming_distance);
criterion_main!(benches);
