//! Banner grabbing over TCP.
//!
//! Each port gets up to `retries` attempts. An attempt connects, writes the
//! port's seed (if any), sends three line-terminator probes, then reads
//! until the read deadline, an error, EOF, or the read cap. The first
//! attempt that reads any bytes at all ends the retries. Every attempt
//! reports to the shared rate controller and every wait in between is
//! jittered by it.
//!
//! Banners are kept as raw bytes; only surrounding ASCII whitespace is
//! removed.

use crate::error::ScanError;
use crate::scanner::pacing::{Pacer, PROBE_JITTER, RETRY_JITTER, STAGGER_JITTER};
use crate::scanner::traits::{Connector, Scanner};
use crate::scanner::{RateLimiter, SeedTable};
use crate::types::{ScanResult, ScanTask};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

/// Probes sent after seeding to coax line-oriented services into talking.
const PROBES: [&[u8]; 3] = [b"\r\n", b"\r\n\r\n", b"\n\n"];

/// Bytes requested per read.
const READ_CHUNK: usize = 4096;

/// Retry and read limits for one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabPolicy {
    /// Total attempts per port.
    pub retries: u32,
    /// Deadline for the whole read phase, measured from its start.
    pub read_deadline: Duration,
    /// Reads per attempt.
    pub max_reads: usize,
}

impl GrabPolicy {
    pub const DEFAULT_RETRIES: u32 = 3;
    pub const DEFAULT_READ_DEADLINE: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_READS: usize = 5;

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    pub fn with_read_deadline(mut self, deadline: Duration) -> Self {
        self.read_deadline = deadline;
        self
    }
}

impl Default for GrabPolicy {
    fn default() -> Self {
        Self {
            retries: Self::DEFAULT_RETRIES,
            read_deadline: Self::DEFAULT_READ_DEADLINE,
            max_reads: Self::DEFAULT_MAX_READS,
        }
    }
}

/// How a single attempt ended.
#[derive(Debug)]
enum Attempt {
    Banner(Vec<u8>),
    Silent,
    ConnectFailed(ScanError),
}

/// Runs the connect/seed/probe/read sequence against one port.
#[derive(Debug)]
pub struct BannerGrabber<C> {
    connector: C,
    pacer: Pacer,
    seeds: SeedTable,
    policy: GrabPolicy,
    limiter: Option<RateLimiter>,
}

impl<C: Connector> BannerGrabber<C> {
    /// Create a grabber with the default seeds and policy.
    pub fn new(connector: C, pacer: Pacer) -> Self {
        Self {
            connector,
            pacer,
            seeds: SeedTable::default(),
            policy: GrabPolicy::default(),
            limiter: None,
        }
    }

    pub fn with_seeds(mut self, seeds: SeedTable) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_policy(mut self, policy: GrabPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cap connection attempts per second.
    pub fn with_rate_limiter(mut self, limiter: Option<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Grab a banner from `host:port`.
    ///
    /// Returns the whitespace-trimmed banner, or `None` once every attempt
    /// came back empty or failed to connect. A peer that answered with
    /// whitespace alone counts as answered: no retry, and no banner.
    pub async fn grab(&self, host: &str, port: u16) -> Option<Vec<u8>> {
        for attempt in 1..=self.policy.retries {
            match self.attempt(host, port).await {
                Attempt::Banner(raw) => {
                    self.pacer.record(true);
                    let banner = raw.trim_ascii();
                    if banner.is_empty() {
                        debug!(host, port, attempt, "blank banner");
                        return None;
                    }
                    debug!(host, port, attempt, bytes = banner.len(), "banner captured");
                    return Some(banner.to_vec());
                }
                Attempt::Silent => {
                    self.pacer.record(false);
                    debug!(host, port, attempt, "no banner");
                }
                Attempt::ConnectFailed(e) => {
                    self.pacer.record(false);
                    debug!(host, port, attempt, error = %e, "connect failed");
                }
            }

            if attempt < self.policy.retries {
                self.pacer.pause(RETRY_JITTER).await;
            }
        }

        None
    }

    async fn attempt(&self, host: &str, port: u16) -> Attempt {
        if let Some(limiter) = &self.limiter {
            limiter.wait().await;
        }

        let mut stream = match self.connector.connect(host, port).await {
            Ok(stream) => stream,
            Err(e) => return Attempt::ConnectFailed(e),
        };

        if let Some(seed) = self.seeds.get(port) {
            send(&mut stream, seed).await;
        }

        for probe in PROBES {
            send(&mut stream, probe).await;
            self.pacer.pause(PROBE_JITTER).await;
        }

        let raw = self.read_banner(&mut stream).await;
        if raw.is_empty() {
            Attempt::Silent
        } else {
            Attempt::Banner(raw)
        }
    }

    /// Accumulate up to `max_reads` reads before the read deadline.
    async fn read_banner<S>(&self, stream: &mut S) -> Vec<u8>
    where
        S: AsyncRead + Unpin,
    {
        let deadline = Instant::now() + self.policy.read_deadline;
        let mut banner = Vec::new();
        let mut buf = vec![0u8; READ_CHUNK];

        for _ in 0..self.policy.max_reads {
            match timeout_at(deadline, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => banner.extend_from_slice(&buf[..n]),
                Ok(Err(e)) => {
                    trace!(error = %e, "read failed");
                    break;
                }
                Err(_) => break,
            }
            self.pacer.pause(PROBE_JITTER).await;
        }

        banner
    }
}

/// Write errors are ignored; a service that already sent its banner and
/// hung up may still have bytes waiting to be read.
async fn send<S>(stream: &mut S, payload: &[u8])
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = stream.write_all(payload).await {
        trace!(error = %e, "write failed");
    }
}

#[async_trait]
impl<C: Connector> Scanner for BannerGrabber<C> {
    async fn scan(&self, task: ScanTask) -> Option<ScanResult> {
        self.pacer.pause(STAGGER_JITTER).await;
        let banner = self.grab(&task.host, task.port.as_u16()).await?;
        ScanResult::new(task, banner)
    }
}
