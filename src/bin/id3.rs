use clap::Parser;
use rusty_id3::bayes::categorical::CategoricalNB;
use rusty_id3::data::dataset::Dataset;
use rusty_id3::metrics::confusion::ClassificationMetrics;
use rusty_id3::trees::classifier::Id3Classifier;
use rusty_id3::trees::params::UnseenValuePolicy;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Train an ID3 decision tree and a naive Bayes baseline on categorical CSV data
#[derive(Debug, Parser)]
#[command(name = "id3")]
#[command(version)]
struct Options {
    /// Training data (CSV, label in the last column by default)
    train_path: PathBuf,

    /// Separate test data; the training data is split when absent
    #[arg(long = "test")]
    test_path: Option<PathBuf>,

    /// Share of records used for training when splitting
    #[arg(long, default_value = "0.75")]
    split: f64,

    /// Random seed for reproducible splits
    #[arg(long)]
    seed: Option<u64>,

    /// Position of the label column
    #[arg(long = "label")]
    label_index: Option<usize>,

    /// First row holds column names
    #[arg(long)]
    header: bool,

    /// Strip whitespace around every CSV field
    #[arg(long)]
    trim: bool,

    /// Write the tree as XML
    #[arg(long = "xml")]
    xml_path: Option<PathBuf>,

    /// Fail on values the tree was not trained on instead of using the majority label
    #[arg(long)]
    strict: bool,
}

fn report<M: ClassificationMetrics>(
    name: &str,
    model: &M,
    actual: &[String],
    predicted: &[String],
) -> Result<(), Box<dyn Error>> {
    let matrix = model.confusion_matrix(actual, predicted)?;
    println!("{}", name);
    println!("{}", matrix);
    println!(
        "Accuracy: {:.2}%\n",
        model.accuracy(actual, predicted)? * 100.0
    );
    Ok(())
}

fn run(options: Options) -> Result<(), Box<dyn Error>> {
    let dataset = Dataset::from_csv_path(
        &options.train_path,
        options.header,
        options.label_index,
        options.trim,
    )?;
    info!(path = %options.train_path.display(), records = dataset.nrows(), "Loaded dataset");

    let (train_dataset, test_dataset) = match &options.test_path {
        Some(path) => (
            dataset,
            Dataset::from_csv_path(path, options.header, options.label_index, options.trim)?,
        ),
        None => dataset.train_test_split(options.split, options.seed)?,
    };

    let mut tree = Id3Classifier::new();
    if options.strict {
        tree.set_unseen_value(UnseenValuePolicy::Error);
    }
    tree.fit(&train_dataset)?;

    let actual = test_dataset.labels();
    let mut predicted = Vec::with_capacity(actual.len());
    let mut misses = 0;
    for record in test_dataset.records() {
        match tree.classify(record) {
            Ok(label) => predicted.push(label),
            Err(err) => {
                warn!(%err, "Record could not be classified");
                misses += 1;
                predicted.push("?".to_string());
            }
        }
    }
    if misses > 0 {
        println!("Unclassifiable records: {}", misses);
    }
    report("ID3 decision tree", &tree, &actual, &predicted)?;

    let mut bayes = CategoricalNB::new();
    bayes.fit(&train_dataset)?;
    let predicted = bayes.predict(test_dataset.records())?;
    report("Categorical naive Bayes", &bayes, &actual, &predicted)?;

    if let Some(path) = &options.xml_path {
        fs::write(path, tree.to_xml()?)?;
        info!(path = %path.display(), "Wrote tree");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = Options::parse();

    if let Err(err) = run(options) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
