use criterion::{criterion_group, criterion_main, Criterion};
use ircore::stemmer::stem;
use ircore::tokenizer::tokenize;

fn sample_text() -> String {
    let words = [
        "Généralisations", "relational", "hopefulness", "running", "caresses", "agreed",
        "controlling", "Straße", "œuvre", "adoption", "the", "of", "motoring", "conflated",
    ];
    words.iter().cycle().take(5_000).copied().collect::<Vec<_>>().join(" ")
}

fn bench_tokenize(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("tokenize_sample", |b| b.iter(|| tokenize(&text)));
    c.bench_function("tokenize_and_stem_sample", |b| {
        b.iter(|| tokenize(&text).iter().map(|t| stem(t)).collect::<Vec<_>>())
    });
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
