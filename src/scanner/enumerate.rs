//! Cross product of targets and ports.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Port, PortSelection, ScanTask};

/// Produces one [`ScanTask`] per (host, port) pair, host-major.
#[derive(Debug, Clone)]
pub struct Enumerator {
    hosts: Vec<String>,
    ports: Vec<Port>,
}

impl Enumerator {
    /// Fails with [`ConfigError::NoTargets`] when `hosts` is empty.
    pub fn new(hosts: Vec<String>, selection: &PortSelection) -> ConfigResult<Self> {
        if hosts.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        Ok(Self {
            hosts,
            ports: selection.ports(),
        })
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Total number of tasks.
    pub fn len(&self) -> usize {
        self.hosts.len() * self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily yield every task.
    pub fn tasks(&self) -> impl Iterator<Item = ScanTask> + '_ {
        self.hosts.iter().flat_map(move |host| {
            self.ports
                .iter()
                .map(move |&port| ScanTask::new(host.as_str(), port))
        })
    }
}
