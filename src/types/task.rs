//! Per-(host, port) values passed through the pipeline.

use super::Port;
use std::fmt;

/// One unit of work: grab a banner from `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTask {
    pub host: String,
    pub port: Port,
}

impl ScanTask {
    pub fn new(host: impl Into<String>, port: Port) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ScanTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A banner captured from a port. Only ever built with a non-empty banner.
///
/// The banner is whatever bytes the service sent, which need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub host: String,
    pub port: Port,
    pub banner: Vec<u8>,
}

impl ScanResult {
    /// Build a result, or `None` when the banner is empty.
    pub fn new(task: ScanTask, banner: Vec<u8>) -> Option<Self> {
        if banner.is_empty() {
            return None;
        }
        Some(Self {
            host: task.host,
            port: task.port,
            banner,
        })
    }

    /// The output line `host:port - banner\n`, banner bytes untouched.
    pub fn line(&self) -> Vec<u8> {
        let mut line = format!("{}:{} - ", self.host, self.port).into_bytes();
        line.extend_from_slice(&self.banner);
        line.push(b'\n');
        line
    }
}

/// Lossy rendering of the output line, for logs and messages.
impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}",
            self.host,
            self.port,
            String::from_utf8_lossy(&self.banner)
        )
    }
}
