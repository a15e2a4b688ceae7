use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::info;

use chirp::{
    ClassMap, Corpus, EmbeddingAligner, EmbeddingTable, FeatureKind, FeatureVectorizer,
    FilteringTokenizer, ModelArtifacts, Predictor, PrototypeModel, SequenceEncoder,
    TermStatistics, WordTokenizer,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory to write model artifacts and predictions into
    #[arg(short, long, default_value = "chirp-model")]
    save_dir: PathBuf,

    /// Feature kind for the classic path (binary, count, frequency, tf-idf)
    #[arg(short, long, default_value = "tf-idf")]
    feature_kind: String,

    /// Stopword threshold k; cutoff is corpus_size / k, 0 disables removal
    #[arg(long, default_value_t = 10)]
    stopword_threshold: usize,

    /// Optional word2vec-format text file with pretrained embeddings
    #[arg(short, long)]
    embeddings: Option<PathBuf>,

    /// Embedding dimensionality when no pretrained file is given
    #[arg(long, default_value_t = 16)]
    dimension: usize,

    /// Fixed sequence length for the neural path
    #[arg(long, default_value_t = 12)]
    max_len: usize,

    /// Minimum vocabulary count for tokens without a pretrained vector
    #[arg(long, default_value_t = 1)]
    min_count: u64,
}

fn train_corpus() -> Corpus {
    Corpus::from_labeled(vec![
        ("loving the new phone, battery lasts forever", "positive"),
        ("best concert of my life, still buzzing", "positive"),
        ("this coffee place is my happy spot", "positive"),
        ("sunshine and a day off, perfect combination", "positive"),
        ("train delayed again, commute ruined my morning", "negative"),
        ("worst customer service I have ever seen", "negative"),
        ("phone died mid call, really fed up", "negative"),
        ("rain flooded the street and my shoes", "negative"),
    ])
}

fn test_corpus() -> Corpus {
    Corpus::from_labeled(vec![
        ("battery life on this phone is great", "positive"),
        ("the service today was terrible", "negative"),
        ("perfect day for a concert", "positive"),
    ])
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting pipeline demo ===");
    let start_time = Instant::now();

    let mut train = train_corpus();
    let word_tokenizer = WordTokenizer::new();
    let filtering_tokenizer = FilteringTokenizer::new();

    // Classic path: corpus statistics into sparse feature vectors.
    let kind = FeatureKind::from_str(&args.feature_kind)?;
    let statistics = TermStatistics::build(&mut train, &word_tokenizer, args.stopword_threshold)?;
    let vectorizer = FeatureVectorizer::new(kind);
    vectorizer.apply(&mut train, &word_tokenizer, &statistics)?;

    println!("Feature space: {} features ({})", train.feature_names().len(), kind);
    if let Some(features) = train.get(0).and_then(|d| d.features()) {
        let mut top: Vec<(&String, &f64)> = features.iter().collect();
        top.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
        println!("Top features of the first document:");
        for (term, value) in top.iter().take(5) {
            println!("  {}: {:.4}", term, value);
        }
    }

    // Neural path: vocabulary, aligned embeddings, encoded sequences.
    let vocab = chirp::Vocabulary::build(&train, &filtering_tokenizer)?;
    let table = match &args.embeddings {
        Some(path) => EmbeddingTable::from_text_file(path, Some(&vocab))?,
        None => EmbeddingTable::new(args.dimension),
    };
    let alignment = EmbeddingAligner::new(args.min_count)
        .with_seed(7)
        .align(&table, &vocab)?;
    println!(
        "Aligned embeddings: {} tokens, dimension {}",
        alignment.vocab_size(),
        alignment.dimension()
    );

    let classes = ClassMap::from_corpus(&train)?;
    let encoder = SequenceEncoder::new(args.max_len);
    let (sequences, labels) = chirp::convert_corpus(
        &mut train,
        &filtering_tokenizer,
        alignment.word_index(),
        &encoder,
        &classes,
    )?;

    let word_index = alignment.word_index().clone();
    let (_, weights, _) = alignment.into_parts();
    let model = PrototypeModel::train(weights, args.max_len, &sequences, &labels)?;

    // Persist, reload, predict: the full artifact lifecycle.
    let artifacts = ModelArtifacts::new(vocab, args.max_len, word_index, classes)?;
    artifacts.save(&args.save_dir)?;
    let reloaded = ModelArtifacts::load(&args.save_dir)?;
    let predictor = Predictor::new(reloaded, model)?;

    let mut test = test_corpus();
    let predicted = predictor.predict_corpus(&mut test, &filtering_tokenizer)?;
    let predictions_path = args.save_dir.join("predictions.tsv");
    predictor.save_predictions(&test, &predictions_path)?;

    println!("\nPredictions:");
    let mut correct = 0usize;
    for document in test.iter() {
        let gold = document.gold_label().unwrap_or("?");
        let pred = document.pred_label().unwrap_or("?");
        if gold == pred {
            correct += 1;
        }
        println!("  [{} / gold {}] {}", pred, gold, document.text());
    }
    println!(
        "Accuracy: {}/{} (predictions written to {:?})",
        correct,
        predicted.len(),
        predictions_path
    );

    info!("=== Demo complete ({:.2?}) ===", start_time.elapsed());
    Ok(())
}
