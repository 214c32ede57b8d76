use criterion::{criterion_group, criterion_main, Criterion};

use tribal_core::traits::EmbeddingProvider;
use tribal_embeddings::{LocalProvider, MockProvider};

fn bench_mock_embed_single(c: &mut Criterion) {
    let provider = MockProvider::new(1024);
    c.bench_function("mock_embed_single", |b| {
        b.iter(|| {
            provider
                .embed("rust programming language systems design patterns")
                .unwrap()
        })
    });
}

fn bench_mock_embed_batch(c: &mut Criterion) {
    let provider = MockProvider::new(1024);
    let texts: Vec<String> = (0..10)
        .map(|i| format!("test embedding text number {i} with some content"))
        .collect();
    c.bench_function("mock_embed_batch_10", |b| {
        b.iter(|| provider.embed_batch(&texts).unwrap())
    });
}

fn bench_local_embed_single(c: &mut Criterion) {
    let provider = LocalProvider::new(1024, "local-bench");
    c.bench_function("local_embed_single", |b| {
        b.iter(|| provider.embed("the auth-service depends on postgresql").unwrap())
    });
}

criterion_group!(
    benches,
    bench_mock_embed_single,
    bench_mock_embed_batch,
    bench_local_embed_single
);
criterion_main!(benches);
