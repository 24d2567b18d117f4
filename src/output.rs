//! Output handling.
//!
//! Result lines go to stdout through a single [`ResultSink`]; everything
//! meant for the operator (errors, warnings, the summary) goes to stderr.

use crate::scanner::ScanStats;
use crate::types::ScanResult;
use console::style;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Single consumer of scan results.
///
/// Writes one `host:port - banner` line per result in arrival order, which
/// is completion order, and stops when every sender has been dropped.
#[derive(Debug)]
pub struct ResultSink<W> {
    results: UnboundedReceiver<ScanResult>,
    out: W,
}

impl<W> ResultSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(results: UnboundedReceiver<ScanResult>, out: W) -> Self {
        Self { results, out }
    }

    /// Drain the channel until it closes. Returns the writer and the
    /// number of lines written.
    pub async fn run(mut self) -> io::Result<(W, usize)> {
        let mut lines = 0;
        while let Some(result) = self.results.recv().await {
            self.out.write_all(&result.line()).await?;
            self.out.flush().await?;
            lines += 1;
        }
        Ok((self.out, lines))
    }

    /// Run the sink on its own task.
    pub fn spawn(self) -> JoinHandle<io::Result<(W, usize)>> {
        tokio::spawn(self.run())
    }
}

/// Print the end-of-scan summary.
pub fn print_summary(stats: &ScanStats) {
    print_info(&format!(
        "{} banners from {} ports in {:.2}s",
        style(stats.found).green().bold(),
        stats.tasks,
        stats.duration.as_secs_f64()
    ));
    if stats.panicked > 0 {
        print_warning(&format!("{} scan tasks aborted", stats.panicked));
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}
