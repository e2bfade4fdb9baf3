use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace};

use gitpulse::config::{CommitStrategy, MarkerFallback, PulseConfig, DEFAULT_INTERVAL_MS};
use gitpulse::orchestrator::CommitOrchestrator;
use gitpulse::scheduler::Scheduler;
use gitpulse::subprocess::SubprocessManager;

/// Commit working-tree changes on a fixed schedule
#[derive(Parser)]
#[command(name = "gitpulse")]
#[command(about = "Periodic auto-commit daemon driven by in-file COMMIT markers", long_about = None)]
struct Cli {
    /// Polling interval in milliseconds
    #[arg(value_name = "INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// How changes are grouped into commits
    #[arg(long, value_enum, default_value_t = CommitStrategy::PerFile)]
    strategy: CommitStrategy,

    /// Message for files without a marker (default depends on strategy)
    #[arg(long, value_enum)]
    fallback: Option<MarkerFallback>,

    /// Remote the per-file strategy pushes to
    #[arg(long, default_value = "origin")]
    remote: String,

    /// Branch the per-file strategy pushes to
    #[arg(long, default_value = "main")]
    branch: String,

    /// Additional file names to exclude from auto-commits
    #[arg(long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Repository root
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Run exactly one cycle and exit
    #[arg(long)]
    once: bool,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> PulseConfig {
        let interval = Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS));
        let fallback = self
            .fallback
            .unwrap_or_else(|| self.strategy.default_fallback());

        PulseConfig::new(self.path, self.strategy)
            .with_interval(interval)
            .with_fallback(fallback)
            .with_push_target(&self.remote, &self.branch)
            .with_extra_exclusions(self.exclude)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,tokio=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("gitpulse started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let once = cli.once;
    let config = cli.into_config();
    let manager = SubprocessManager::production();
    let git = Arc::new(manager.git(&config.repo_root));
    let interval = config.interval;
    let orchestrator = CommitOrchestrator::new(git, config);

    if once {
        let report = orchestrator
            .run_cycle()
            .await
            .context("commit cycle failed")?;
        info!("cycle finished with {} commit(s)", report.commits);
        return Ok(());
    }

    let scheduler = Scheduler::new(interval);
    let handle = scheduler.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current cycle");
            handle.shutdown();
        }
    });

    info!("starting commit cycles every {}ms", interval.as_millis());
    scheduler.run(orchestrator).await;
    Ok(())
}
