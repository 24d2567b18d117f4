//! # skulk - a jittered TCP banner grabber
//!
//! skulk reads targets, connects to every selected port on each of them and
//! coaxes out a service banner: it writes a port-specific seed where one is
//! known, sends a handful of line-terminator probes, then reads what comes
//! back. Attempts are retried, every wait is randomized, and a single
//! process-wide rate factor stretches or shrinks all waits depending on how
//! the scan is going.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use skulk::banner::BannerGrabber;
//! use skulk::scanner::{Pacer, TcpConnector};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let grabber = BannerGrabber::new(TcpConnector::new(Duration::from_secs(3)), Pacer::default());
//!
//!     if let Some(banner) = grabber.grab("192.168.1.1", 22).await {
//!         println!("192.168.1.1:22 - {}", String::from_utf8_lossy(&banner));
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, ranges, targets and the per-task values
//! - [`scanner`] - Enumeration, admission, pacing and the orchestrator
//! - [`banner`] - The connect/seed/probe/read retry protocol
//! - [`output`] - The result sink and operator messages
//! - [`config`] - Settings file handling
//! - [`cli`] - Argument parsing and pipeline wiring
//! - [`error`] - Error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use banner::{BannerGrabber, GrabPolicy};
pub use error::{ConfigError, ScanError};
pub use scanner::{run_scan, Admission, Enumerator, RateController, ScanStats, Scanner};
pub use types::{Port, PortRange, PortSelection, ScanResult, ScanTask};
