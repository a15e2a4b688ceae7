use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chirp::{
    Corpus, EmbeddingAligner, EmbeddingTable, FeatureKind, FeatureVectorizer, FilteringTokenizer,
    SequenceEncoder, TermStatistics, Tokenizer, Vocabulary, WordTokenizer,
};

fn synthetic_corpus(documents: usize) -> Corpus {
    let words = [
        "phone", "battery", "train", "coffee", "concert", "service", "morning", "weather",
        "delayed", "loving", "terrible", "perfect", "commute", "sunshine", "ruined", "happy",
    ];
    let mut corpus = Corpus::new();
    for i in 0..documents {
        let text: Vec<&str> = (0..12).map(|j| words[(i * 7 + j * 3) % words.len()]).collect();
        corpus.push(chirp::Document::labeled(
            text.join(" "),
            if i % 2 == 0 { "positive" } else { "negative" },
        ));
    }
    corpus
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("TermStatistics");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    for &size in &[100usize, 1000] {
        group.bench_function(format!("build_{}", size), |b| {
            b.iter(|| {
                let mut corpus = synthetic_corpus(size);
                TermStatistics::build(black_box(&mut corpus), &WordTokenizer::new(), 10).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_vectorization(c: &mut Criterion) {
    let mut corpus = synthetic_corpus(500);
    let tokenizer = WordTokenizer::new();
    let statistics = TermStatistics::build(&mut corpus, &tokenizer, 10).unwrap();
    let vectorizer = FeatureVectorizer::new(FeatureKind::TfIdf);
    let text = "loving the phone battery but the commute this morning was terrible";

    let mut group = c.benchmark_group("FeatureVectorizer");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("vectorize", |b| {
        b.iter(|| {
            vectorizer
                .vectorize(black_box(text), &tokenizer, &statistics)
                .unwrap()
        })
    });

    group.finish();
}

fn bench_alignment_and_encoding(c: &mut Criterion) {
    let corpus = synthetic_corpus(500);
    let tokenizer = FilteringTokenizer::new();
    let vocab = Vocabulary::build(&corpus, &tokenizer).unwrap();
    let table = EmbeddingTable::new(64);

    let mut group = c.benchmark_group("Alignment");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("align", |b| {
        b.iter(|| {
            EmbeddingAligner::new(2)
                .with_seed(7)
                .align(black_box(&table), &vocab)
                .unwrap()
        })
    });

    let alignment = EmbeddingAligner::new(2).with_seed(7).align(&table, &vocab).unwrap();
    let encoder = SequenceEncoder::new(20);
    let tokens = tokenizer
        .tokens("loving the phone battery but the commute this morning was terrible")
        .unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| {
            encoder
                .encode(black_box(&tokens), alignment.word_index())
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_statistics,
    bench_vectorization,
    bench_alignment_and_encoding
);
criterion_main!(benches);
