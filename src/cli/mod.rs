//! Wine quality CLI
//!
//! Command-line interface for running the pipeline, exploring a dataset and
//! inspecting a file.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::analysis::{describe, group_means, null_report, target_correlations};
use crate::dataset::{DataLoader, Dataset};
use crate::pipeline::{PipelineConfig, PipelineOutcome, PipelineRunner};
use crate::preprocessing::ScalingPolicy;

// ─── Logging ───────────────────────────────────────────────────────────────────

/// Log subscriber for the binary; `RUST_LOG` overrides the default filter
pub fn log_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wine_quality=info".into()),
        )
        .with_writer(writer)
        .finish()
}

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

/// Print multi-line text indented to match the sections
fn block(text: &str) {
    for line in text.lines() {
        println!("  {}", line);
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "wine-quality")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reproducible wine quality classification with a random forest")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split, scale, train and evaluate on a wine CSV
    Run {
        /// Wine quality CSV (`;` or `,` delimited)
        #[arg(short, long)]
        data: PathBuf,

        /// JSON pipeline configuration; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Fraction of rows held out for testing
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Seed for the train/test shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trees
        #[arg(long)]
        trees: Option<usize>,

        /// Maximum tree depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Scaling policy (applied, discarded, disabled)
        #[arg(long)]
        scaling: Option<ScalingPolicy>,

        /// Feature column to drop before training (repeatable)
        #[arg(long = "drop")]
        drop: Vec<String>,

        /// Write the full outcome as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Descriptive statistics, nulls, correlations and per-quality means
    Explore {
        /// Wine quality CSV
        #[arg(short, long)]
        data: PathBuf,

        /// JSON pipeline configuration (split settings)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show data information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Flag overrides for [`cmd_run`]
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub test_fraction: Option<f64>,
    pub seed: Option<u64>,
    pub trees: Option<usize>,
    pub max_depth: Option<usize>,
    pub scaling: Option<ScalingPolicy>,
    pub drop: Vec<String>,
}

impl RunOverrides {
    /// Apply the set flags on top of `config`
    pub fn apply(self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(f) = self.test_fraction {
            config.test_fraction = f;
        }
        if let Some(seed) = self.seed {
            config.split_seed = seed;
        }
        if let Some(n) = self.trees {
            config.forest.n_estimators = n;
        }
        if self.max_depth.is_some() {
            config.forest.max_depth = self.max_depth;
        }
        if let Some(policy) = self.scaling {
            config.scaling = policy;
        }
        if !self.drop.is_empty() {
            config.drop_features = self.drop;
        }
        config
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    Ok(match path {
        Some(p) => PipelineConfig::from_json_file(p)?,
        None => PipelineConfig::default(),
    })
}

fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    step_run("Loading data");
    let start = Instant::now();
    let dataset = DataLoader::new().load_wine(path)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        dataset.n_rows(),
        dataset.n_columns(),
        start.elapsed()
    ));
    Ok(dataset)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(
    data_path: &Path,
    config_path: Option<&Path>,
    overrides: RunOverrides,
    json_out: Option<&Path>,
) -> anyhow::Result<()> {
    section("Run");

    let config = overrides.apply(load_config(config_path)?);
    config.validate()?;

    let dataset = load_dataset(data_path)?;

    step_run(&format!(
        "Training {} trees",
        config.forest.n_estimators.to_string().cyan()
    ));
    let outcome = PipelineRunner::new(config).run(&dataset)?;
    step_done(&format!("{:.3}s", outcome.elapsed_secs));

    print_outcome(&outcome);

    if let Some(path) = json_out {
        outcome.save(path)?;
        step_ok(&format!("Saved → {}", path.display()));
    }

    println!();
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    section("Split");
    kv("Train rows", &outcome.n_train.to_string());
    kv("Test rows", &outcome.n_test.to_string());
    kv("Scaling", &outcome.scaling.to_string());

    section("Classification report");
    block(&outcome.report.to_string());

    section("Confusion matrix");
    block(&outcome.report.confusion_matrix.to_string());

    section("Feature importances");
    for (name, importance) in &outcome.feature_importances {
        println!("  {:<24} {:>8.4}", name, importance);
    }

    println!();
    println!(
        "  {:<16} {}",
        muted("Accuracy"),
        format!("{:.4}", outcome.report.accuracy).white().bold()
    );
}

pub fn cmd_explore(data_path: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    section("Explore");

    let config = load_config(config_path)?;
    let loader = DataLoader::new();

    step_run("Loading data");
    let df = loader.load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    section("Missing values");
    let nulls = null_report(&df);
    for entry in &nulls {
        let count = format!("{:>6}", entry.missing);
        let count = if entry.missing > 0 { count.red().bold() } else { count.normal() };
        println!("  {:<24} {}", entry.column, count);
    }

    let gaps: Vec<&str> = nulls
        .iter()
        .filter(|n| n.missing > 0)
        .map(|n| n.column.as_str())
        .collect();
    if !gaps.is_empty() {
        anyhow::bail!(
            "{} has missing or non-finite values in: {}",
            data_path.display(),
            gaps.join(", ")
        );
    }

    let dataset = Dataset::from_wine_frame(&df)?;

    let runner = PipelineRunner::new(config);
    let (train, _) = runner.prepare(&dataset)?;
    let target = runner.config().target_column.clone();
    let target_index = train.column_index(&target)?;

    section(&format!("Describe (train split, {} rows)", train.n_rows()));
    println!(
        "  {:<22} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        muted("Column"),
        muted("mean"),
        muted("std"),
        muted("min"),
        muted("25%"),
        muted("50%"),
        muted("75%"),
        muted("max")
    );
    for s in describe(&train)? {
        println!(
            "  {:<22} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
            s.column, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
        );
    }

    section(&format!("Correlation with {}", target));
    for (name, r) in target_correlations(&train, &target)? {
        let value = format!("{:>+8.4}", r);
        let value = if r.abs() >= 0.3 { value.white().bold() } else { value.normal() };
        println!("  {:<24} {}", name, value);
    }

    let means = group_means(&train, target_index)?;
    section(&format!("Mean by {}", target));
    print!("  {:<24}", muted("Feature"));
    for group in &means.groups {
        print!(" {:>8}", muted(&format!("{} (n={})", group.label, group.count)));
    }
    println!();
    for (idx, feature) in means.feature_names.iter().enumerate() {
        print!("  {:<24}", feature);
        for group in &means.groups {
            print!(" {:>8.3}", group.means[idx]);
        }
        println!();
    }

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let loader = DataLoader::new();
    let info = loader.file_info(data_path)?;
    let df = loader.load_csv(data_path)?;

    kv("File", &info.path.display().to_string());
    kv("Size", &format!("{:.1} KB", info.file_size as f64 / 1024.0));
    kv("Delimiter", &format!("'{}'", info.delimiter as char));
    kv("Rows", &df.height().to_string());
    kv("Columns", &df.width().to_string());
    println!();

    println!("  {:<24} {:<12} {:>6}", muted("Column"), muted("Type"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(44)));

    let nulls = null_report(&df);
    for (col, entry) in df.get_columns().iter().zip(nulls.iter()) {
        println!(
            "  {:<24} {:<12} {:>6}",
            entry.column,
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            entry.missing
        );
    }

    println!();
    Ok(())
}
