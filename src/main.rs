//! `bcw-train`: fit the classifier and write the model artifact.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bcw::{run_training, TrainingConfig};
use clap::Parser;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bcw-train",
    about = "Train the breast cancer classifier and serialize it for serving",
    version
)]
struct Args {
    /// YAML training configuration. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset file (UCI wdbc.data or headered CSV).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Where to write the model artifact.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Shuffle seed for the train/test split.
    #[arg(long)]
    seed: Option<u64>,

    /// Mirror logs to this file.
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Log to stdout only.
    #[arg(long)]
    no_log_file: bool,

    /// Log filter, e.g. `info` or `model=debug`.
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(TrainingConfig, String)> {
        let mut cfg = match &self.config {
            Some(path) => TrainingConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => TrainingConfig::default(),
        };
        if let Some(data) = self.data {
            cfg.dataset.path = data;
        }
        if let Some(output) = self.output {
            cfg.output.artifact_path = output;
        }
        if let Some(seed) = self.seed {
            cfg.dataset.seed = seed;
        }
        if let Some(log_file) = self.log_file {
            cfg.output.log_file = Some(log_file);
        }
        if self.no_log_file {
            cfg.output.log_file = None;
        }
        cfg.validate()?;
        Ok((cfg, self.log_level))
    }
}

fn init_tracing(cfg: &TrainingConfig, filter: &str) -> anyhow::Result<()> {
    let writer = match &cfg.output.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            BoxMakeWriter::new(std::io::stdout.and(Arc::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).context("invalid log filter")?)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let (cfg, filter) = Args::parse().into_config()?;
    init_tracing(&cfg, &filter)?;

    tracing::info!(
        config = cfg.name.as_deref().unwrap_or("default"),
        dataset = %cfg.dataset.path.display(),
        "starting training pipeline"
    );

    let report = run_training(&cfg).context("training failed")?;
    if let Some(metrics) = report.evaluation() {
        tracing::info!(
            accuracy = %format!("{:.4}", metrics.accuracy),
            f1 = %format!("{:.4}", metrics.f1),
            "model available at {}",
            report.artifact_path.display()
        );
    }
    if let Some(log_file) = &cfg.output.log_file {
        tracing::info!("logs available at {}", log_file.display());
    }
    Ok(())
}
