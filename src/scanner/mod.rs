//! Scanner module - coordinates concurrent banner grabbing.
//!
//! [`run_scan`] walks every task, admits each one through the bounded
//! [`Admission`] pool and spawns it on the tokio runtime. Results stream out
//! through a channel as soon as they are found; the function itself returns
//! only once every spawned task has finished.

pub mod admission;
pub mod enumerate;
pub mod pacing;
pub mod rate_limiter;
pub mod seeds;
pub mod tcp;
pub mod traits;

use crate::types::{ScanResult, ScanTask};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

pub use admission::{Admission, AdmissionToken, DEFAULT_CONCURRENCY};
pub use enumerate::Enumerator;
pub use pacing::{Jitter, NoJitter, Pacer, RandomJitter, RateController};
pub use rate_limiter::RateLimiter;
pub use seeds::SeedTable;
pub use tcp::TcpConnector;
pub use traits::{Connector, Scanner};

/// Summary of a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Tasks dispatched.
    pub tasks: usize,
    /// Tasks that produced a banner.
    pub found: usize,
    /// Tasks that panicked.
    pub panicked: usize,
    pub duration: Duration,
}

impl ScanStats {
    fn absorb(&mut self, outcome: Result<bool, JoinError>) {
        match outcome {
            Ok(true) => self.found += 1,
            Ok(false) => {}
            Err(e) => {
                self.panicked += 1;
                warn!(error = %e, "scan task did not complete");
            }
        }
    }
}

/// Create the progress bar shown in verbose mode.
pub fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Execute every task with bounded concurrency.
///
/// Each task holds an admission token from before it is spawned until it
/// finishes. `results` is consumed and dropped on return, after the last
/// task has completed, so a consumer draining the other end sees the
/// channel close exactly when the scan is over. Callers must not keep
/// their own clone of the sender.
pub async fn run_scan<S, I>(
    scanner: Arc<S>,
    tasks: I,
    admission: &Admission,
    results: UnboundedSender<ScanResult>,
    progress: Option<ProgressBar>,
) -> ScanStats
where
    S: Scanner + 'static,
    I: IntoIterator<Item = ScanTask>,
{
    let start = Instant::now();
    let mut stats = ScanStats::default();
    let mut workers = JoinSet::new();

    for task in tasks {
        let token = admission.acquire().await;
        stats.tasks += 1;

        let scanner = Arc::clone(&scanner);
        let results = results.clone();
        let progress = progress.clone();

        workers.spawn(async move {
            let _token = token;
            let label = progress.as_ref().map(|_| task.to_string());

            let found = match scanner.scan(task).await {
                // A closed channel means the sink is gone; nothing left to do.
                Some(result) => results.send(result).is_ok(),
                None => false,
            };

            if let Some(pb) = progress {
                pb.inc(1);
                if let (true, Some(label)) = (found, label) {
                    pb.set_message(format!("Found banner: {}", label));
                }
            }

            found
        });

        // Reap finished tasks so the set stays bounded by in-flight work.
        while let Some(done) = workers.try_join_next() {
            stats.absorb(done);
        }
    }

    drop(results);

    while let Some(done) = workers.join_next().await {
        stats.absorb(done);
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Scan complete");
    }

    stats.duration = start.elapsed();
    info!(
        tasks = stats.tasks,
        found = stats.found,
        panicked = stats.panicked,
        elapsed_ms = stats.duration.as_millis() as u64,
        "scan finished"
    );
    stats
}
