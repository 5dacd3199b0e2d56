use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use onnx_scoreboard::collector::{self, Backend, CollectOptions};
use onnx_scoreboard::render;

#[derive(Parser)]
#[command(
    name = "onnx-scoreboard",
    about = "Test-result collector and static scoreboard generator for ONNX backends",
    version,
    long_about = None
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a finished test session into report.json and trend.json
    Collect {
        /// JSON dump of the test runner's end-of-session statistics
        #[arg(long)]
        stats: PathBuf,

        /// Directory holding report.json and trend.json
        #[arg(long, env = "RESULTS_DIR", default_value = ".")]
        results_dir: PathBuf,

        /// Directory holding pip-list.json
        #[arg(long, env = "VERSION_DIR", default_value = ".")]
        version_dir: PathBuf,

        /// Scoreboard configuration used to select core packages
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Backend module the tests were run against
        #[arg(long = "onnx_backend", value_enum)]
        onnx_backend: Option<Backend>,
    },

    /// Render the static scoreboard pages
    Render {
        /// Load configuration from the specified JSON file
        #[arg(long)]
        config: PathBuf,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Collect {
            stats,
            results_dir,
            version_dir,
            config,
            onnx_backend,
        } => {
            tracing::info!(stats = %stats.display(), results_dir = %results_dir.display(), "Collecting test results");
            let outcome = collector::run(&CollectOptions {
                stats_path: stats,
                results_dir,
                version_dir,
                config_path: config,
                backend: onnx_backend,
            })?;

            println!(
                "passed: {}, failed: {}, skipped: {} ({} trend entr{}{})",
                outcome.summary.passed,
                outcome.summary.failed,
                outcome.summary.skipped,
                outcome.trend_len,
                if outcome.trend_len == 1 { "y" } else { "ies" },
                if outcome.replaced { ", last entry refreshed" } else { "" },
            );
        }
        Commands::Render { config } => {
            tracing::info!(config = %config.display(), "Rendering scoreboard");
            let outcome = render::run(&config)?;
            for page in &outcome.pages {
                println!("{}", page.display());
            }
        }
    }

    Ok(())
}
