//! TCP connector.
//!
//! Opens plain TCP connections through the operating system's socket API,
//! completing the full handshake. Hostnames go through the standard
//! resolver; IPv6 literals work because host and port are passed apart.

use crate::error::ScanError;
use crate::scanner::traits::Connector;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens TCP connections bounded by a connect timeout.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    /// Create a connector.
    ///
    /// # Arguments
    /// * `timeout` - Upper bound on resolution plus handshake per attempt
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ScanError> {
        match timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(classify(host, port, e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

fn classify(host: &str, port: u16, e: std::io::Error) -> ScanError {
    if e.kind() == ErrorKind::ConnectionRefused {
        return ScanError::ConnectionRefused;
    }

    let error_str = e.to_string().to_lowercase();
    if error_str.contains("unreachable") {
        if error_str.contains("host") {
            ScanError::HostUnreachable
        } else {
            ScanError::NetworkUnreachable(e.to_string())
        }
    } else {
        ScanError::ConnectionFailed {
            target: host.to_string(),
            port,
            reason: e.to_string(),
        }
    }
}
