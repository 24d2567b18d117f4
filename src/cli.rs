//! Command-line interface and scan pipeline wiring.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags left
//! unset fall back to the settings file, then to built-in defaults.

use crate::banner::{BannerGrabber, GrabPolicy};
use crate::config::AppSettings;
use crate::error::ConfigResult;
use crate::output::{self, ResultSink};
use crate::scanner::{
    progress_bar, run_scan, Admission, Enumerator, Jitter, Pacer, RandomJitter, RateController,
    RateLimiter, ScanStats, SeedTable, TcpConnector,
};
use crate::types::{read_targets, PortRange, PortSelection};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tracing::info;

/// Grab service banners from every port of every target read on stdin.
///
/// Targets are read one per line; `http://` and `https://` prefixes and
/// any path are stripped. Each port gets a few connect/probe/read attempts
/// with jittered, adaptively scaled delays. Every banner is printed as
/// `host:port - banner`.
#[derive(Parser, Debug)]
#[command(name = "skulk")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A jittered, adaptively paced TCP banner grabber", long_about = None)]
pub struct Cli {
    /// Port range to scan (e.g., "80-1000")
    #[arg(short = 'p', long = "port-range", value_name = "START-END", default_value = "1-65535")]
    pub port_range: String,

    /// Scan the well-known ports list instead of a range
    #[arg(long)]
    pub top_ports: bool,

    /// Connection timeout in seconds for each attempt
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of concurrent scans
    #[arg(short = 'r', long = "rate-limit", value_name = "N")]
    pub rate_limit: Option<usize>,

    /// Attempts per port
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Connection attempts per second (0 = unlimited)
    #[arg(long = "max-rate", value_name = "PER_SEC")]
    pub max_rate: Option<u32>,

    /// Path to a settings file
    #[arg(long, value_name = "PATH", env = "SKULK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show progress and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Fully resolved scan parameters.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub ports: PortSelection,
    pub timeout: Duration,
    pub concurrency: usize,
    pub policy: GrabPolicy,
    pub max_rate: u32,
    pub seeds: SeedTable,
    pub progress: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        let settings = AppSettings::default();
        Self {
            ports: PortSelection::default(),
            timeout: Duration::from_secs(settings.default_timeout_secs),
            concurrency: settings.default_concurrency,
            policy: GrabPolicy::default().with_retries(settings.default_retries),
            max_rate: settings.default_max_rate,
            seeds: settings.seed_table(),
            progress: false,
        }
    }
}

impl Cli {
    /// Resolve flags against the settings file.
    ///
    /// The port range is only validated when it will be used.
    pub fn options(&self) -> ConfigResult<ScanOptions> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        self.options_with(&settings)
    }

    fn options_with(&self, settings: &AppSettings) -> ConfigResult<ScanOptions> {
        let ports = if self.top_ports {
            PortSelection::Top
        } else {
            PortSelection::Range(self.port_range.parse::<PortRange>()?)
        };

        let retries = self.retries.unwrap_or(settings.default_retries);

        Ok(ScanOptions {
            ports,
            timeout: Duration::from_secs(self.timeout.unwrap_or(settings.default_timeout_secs)),
            concurrency: self.rate_limit.unwrap_or(settings.default_concurrency),
            policy: GrabPolicy::default().with_retries(retries),
            max_rate: self.max_rate.unwrap_or(settings.default_max_rate),
            seeds: settings.seed_table(),
            progress: self.verbose,
        })
    }

    /// Read targets from stdin and scan them, printing results to stdout.
    pub async fn execute(&self) -> anyhow::Result<ScanStats> {
        let options = self.options()?;

        let hosts = read_targets(BufReader::new(tokio::io::stdin()))
            .await
            .context("failed to read targets from stdin")?;

        let report = scan(&options, hosts, tokio::io::stdout(), Arc::new(RandomJitter)).await?;

        if self.verbose {
            output::print_summary(&report.stats);
        }
        Ok(report.stats)
    }
}

/// Outcome of [`scan`].
#[derive(Debug)]
pub struct ScanReport<W> {
    pub stats: ScanStats,
    /// Lines written by the sink.
    pub lines: usize,
    /// The writer handed to [`scan`].
    pub out: W,
}

/// Scan every host on every selected port, streaming results to `out`.
///
/// Fails with [`ConfigError::NoTargets`](crate::error::ConfigError) before
/// any connection is made when `hosts` is empty.
pub async fn scan<W>(
    options: &ScanOptions,
    hosts: Vec<String>,
    out: W,
    jitter: Arc<dyn Jitter>,
) -> anyhow::Result<ScanReport<W>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let enumerator = Enumerator::new(hosts, &options.ports)?;

    let limiter = RateLimiter::per_second(options.max_rate);
    let max_rate = limiter.as_ref().map_or(0, RateLimiter::rate);

    let pacer = Pacer::new(Arc::new(RateController::new()), jitter);
    let grabber = BannerGrabber::new(TcpConnector::new(options.timeout), pacer)
        .with_seeds(options.seeds.clone())
        .with_policy(options.policy)
        .with_rate_limiter(limiter);

    let admission = Admission::new(options.concurrency);
    let progress = options.progress.then(|| progress_bar(enumerator.len()));

    info!(
        targets = enumerator.hosts().len(),
        ports = enumerator.ports().len(),
        tasks = enumerator.len(),
        ports_selected = %options.ports,
        concurrency = admission.capacity(),
        max_rate,
        "starting scan"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let sink = ResultSink::new(rx, out).spawn();

    let stats = run_scan(
        Arc::new(grabber),
        enumerator.tasks(),
        &admission,
        tx,
        progress,
    )
    .await;

    let (out, lines) = sink
        .await
        .context("result sink stopped unexpectedly")?
        .context("failed to write results")?;

    Ok(ScanReport { stats, lines, out })
}
