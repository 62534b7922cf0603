//! facts-worker: prints fact records from watched YAML files.
//!
//! Loads every configured fact file once, then follows them on disk and prints
//! each record (one JSON object per line) on stdout whenever a file is created
//! or modified. Logs go to stderr. Ctrl-C ends the session.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use stupid_facts::{FactWatcher, Record, WatchConfig};

// ── CLI ─────────────────────────────────────────────────────────────

/// Fact file watcher: emits YAML fact records as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "facts-worker", version, about)]
struct Cli {
    /// YAML config file with a `files` list (and optional `debounce_ms`).
    #[arg(long, env = "FACTS_CONFIG")]
    config: Option<PathBuf>,

    /// Fact file to watch; repeat or comma-separate for several.
    #[arg(long = "file", env = "FACTS_FILES", value_delimiter = ',')]
    files: Vec<PathBuf>,

    /// Settle window for filesystem events in milliseconds.
    #[arg(long, env = "FACTS_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,
}

impl Cli {
    /// Merge the config file (if any) with command-line overrides.
    fn watch_config(&self) -> anyhow::Result<WatchConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let config = WatchConfig::from_file(path)?;
                info!(path = %path.display(), files = config.files.len(), "loaded facts config");
                config
            }
            None => WatchConfig::default(),
        };
        config.files.extend(self.files.iter().cloned());
        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
        Ok(config)
    }
}

fn print_record(record: &Record) {
    match serde_json::to_string(record) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "record is not representable as JSON"),
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.watch_config()?;
    if config.is_empty() {
        warn!("no fact files configured (use --file or --config), nothing to watch");
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Record>();
    let watcher = FactWatcher::new(config);
    let stop = watcher.stop_handle();

    let printer = tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            print_record(&record);
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, stopping fact watcher");
            stop.stop();
        }
    });

    info!("facts-worker starting");
    let summary = watcher.run(tx).await?;
    // The sender is gone with the session; drain what is left.
    printer.await?;
    info!(
        targets = summary.targets,
        initial_records = summary.initial_records,
        reloads = summary.reloads,
        reloads_failed = summary.reloads_failed,
        "facts-worker exited cleanly"
    );
    Ok(())
}
