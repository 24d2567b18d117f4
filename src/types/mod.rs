//! Core type definitions using newtype patterns for type safety.

mod port;
mod target;
mod task;

pub use port::{Port, PortRange, PortSelection, RangeError};
pub use target::{read_targets, sanitize_target};
pub use task::{ScanResult, ScanTask};
