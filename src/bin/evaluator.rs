use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

use encore::batch::EvaluationBatchBuilder;
use encore::config::AppConfig;
use encore::evaluation::EvaluationDriver;
use encore::io;
use encore::matrix::CsrMatrix;
use encore::metrics::evaluation_reporter::EvaluationReporter;
use encore::scoring::{PrecomputedScorer, TrainHistoryEncoder};

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path);

    env_logger::Builder::new()
        .parse_filters(&config.log.level)
        .init();

    let meta = io::read_meta(&config.data.meta_path)
        .with_context(|| format!("loading dataset metadata from {}", config.data.meta_path))?;
    println!("num_users: {}", meta.num_users);
    println!("num_items: {}", meta.num_items);

    let train_triplets = io::read_triplets(&config.data.train_data_path)
        .with_context(|| format!("reading train split from {}", config.data.train_data_path))?;
    let train = CsrMatrix::from_triplets(meta.num_users, meta.num_items, &train_triplets)
        .context("building train interaction matrix")?;

    let test_triplets = io::read_triplets(&config.data.test_data_path)
        .with_context(|| format!("reading test split from {}", config.data.test_data_path))?;
    let test = CsrMatrix::from_triplets(meta.num_users, meta.num_items, &test_triplets)
        .context("building test interaction matrix")?;
    println!(
        "train interactions: {}, test interactions: {}",
        train.nnz(),
        test.nnz()
    );

    let score_triplets = io::read_triplets(&config.data.scores_path)
        .with_context(|| format!("reading model scores from {}", config.data.scores_path))?;
    let scorer = PrecomputedScorer::from_triplets(meta.num_users, meta.num_items, &score_triplets)
        .context("building score table")?;

    let encoder = TrainHistoryEncoder::new(&train);
    let builder = EvaluationBatchBuilder::new(&encoder, &train, &test)?;
    let reporter = EvaluationReporter::new(&config.eval.recall_cutoffs, &config.eval.ndcg_cutoffs);
    let mut driver = EvaluationDriver::new(builder, &scorer, reporter);

    let batch_size = config.eval.batch_size.max(1);
    let users: Vec<usize> = (0..meta.num_users).collect();
    let num_batches = users.chunks(batch_size).len() as u64;
    let progress = ProgressBar::new(num_batches);
    progress.set_style(
        ProgressStyle::default_bar().template("{bar:40} {pos}/{len} batches ({eta})"),
    );

    let evaluation_start = Instant::now();
    for batch_users in users.chunks(batch_size) {
        driver.process_batch(batch_users)?;
        progress.inc(1);
    }
    progress.finish_and_clear();
    let elapsed = evaluation_start.elapsed();

    println!("===============================================================");
    println!("===                FINAL EVALUATION RESULTS                ====");
    println!("===============================================================");
    for (name, value) in driver.reporter().results() {
        println!("{}: {:.4}", name, value);
    }
    println!("Qty evaluated users: {}", driver.users_evaluated());
    println!(
        "Evaluation time per user (microseconds): {:.2}",
        elapsed.as_micros() as f64 / driver.users_evaluated().max(1) as f64
    );

    let header = driver.reporter().get_name();
    let values = driver.reporter().result();
    io::write_report(&config.eval.out_path, &header, &values)
        .with_context(|| format!("writing report to {}", config.eval.out_path))?;
    Ok(())
}
