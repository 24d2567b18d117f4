//! Trait seams of the scanning engine.
//!
//! [`Connector`] abstracts how a stream to `host:port` is opened, so the
//! banner protocol can run against in-memory pipes in tests. [`Scanner`]
//! abstracts what a worker does with one task, so the orchestrator can be
//! exercised with instrumented scanners.

use crate::error::ScanError;
use crate::types::{ScanResult, ScanTask};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Opens byte streams to targets.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The stream type produced by a successful connect.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a connection to `host:port`.
    async fn connect(&self, host: &str, port: u16) -> Result<Self::Stream, ScanError>;
}

/// Work performed for a single task.
///
/// # Example
///
/// ```ignore
/// use skulk::scanner::Scanner;
/// use skulk::types::{ScanResult, ScanTask};
///
/// async fn scan_one<S: Scanner>(scanner: &S, task: ScanTask) -> Option<ScanResult> {
///     scanner.scan(task).await
/// }
/// ```
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Scan one task. `None` means no banner was captured.
    async fn scan(&self, task: ScanTask) -> Option<ScanResult>;
}
