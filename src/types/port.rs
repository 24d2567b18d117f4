//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` handles the `start-end` range syntax and `PortSelection`
//! picks between a range and the well-known-port list.

use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port range parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid port range format: '{0}' (expected start-end, e.g. 80-1000)")]
    InvalidFormat(String),
    #[error("invalid port range values: {0}-{1} (ports must be 1-65535)")]
    OutOfBounds(i64, i64),
    #[error("invalid port range values: start ({0}) > end ({1})")]
    Reversed(u16, u16),
}

/// An inclusive range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range.
    pub fn new(start: Port, end: Port) -> Result<Self, RangeError> {
        if start.0 > end.0 {
            Err(RangeError::Reversed(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// The whole port space, 1-65535.
    pub const fn full() -> Self {
        Self {
            start: Port(Port::MIN),
            end: Port(Port::MAX),
        }
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// A valid range always holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Parses exactly `start-end`: two integers around a single dash.
///
/// Bounds are parsed wider than `u16` so that `0-10` and `1-70000` report
/// as out of bounds rather than as malformed.
impl FromStr for PortRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bounds: Vec<&str> = s.split('-').collect();
        if bounds.len() != 2 {
            return Err(RangeError::InvalidFormat(s.to_string()));
        }

        let start: i64 = bounds[0]
            .parse()
            .map_err(|_| RangeError::InvalidFormat(s.to_string()))?;
        let end: i64 = bounds[1]
            .parse()
            .map_err(|_| RangeError::InvalidFormat(s.to_string()))?;

        let in_bounds = |v: i64| (i64::from(Port::MIN)..=i64::from(Port::MAX)).contains(&v);
        if !in_bounds(start) || !in_bounds(end) {
            return Err(RangeError::OutOfBounds(start, end));
        }

        // Both values were just checked against 1-65535.
        Self::new(Port(start as u16), Port(end as u16))
    }
}

/// Well-known ports scanned by `--top-ports`.
const TOP_PORTS: &[u16] = &[
    1, 7, 9, 11, 13, 17, 19, 20, 21, 22, 23, 25, 26, 37, 42, 49, 53, 67, 68, 69, 70, 79, 80, 81,
    82, 83, 84, 85, 88, 96, 98, 106, 109, 110, 111, 113, 119, 123, 129, 135, 137, 138, 139, 143,
    161, 162, 179, 199, 220, 256, 389, 427, 443, 444, 445, 465, 500, 502, 512, 513, 514, 520, 523,
    554, 587, 623, 631, 636, 873, 901, 989, 990, 992, 993, 995, 1000, 1025, 1080, 1099, 1194,
    1214, 1337, 1352, 1433, 1434, 1512, 1521, 1720, 1723, 1755, 1883, 1900, 2000, 2048, 2049,
    2082, 2083, 2086, 2087, 20880, 2100, 2200, 2222, 2375, 2376, 2483, 2484, 25565, 2601, 2604,
    2947, 3050, 3128, 3260, 3306, 3388, 3389, 3456, 3632, 4000, 4045, 4444, 4500, 4786, 4848,
    5000, 5353, 5432, 5555, 5632, 5800, 5900, 5901, 5985, 6000, 6379, 6646, 6667, 7000, 7001,
    7070, 7777, 8000, 8080, 8081, 8088, 8181, 8222, 8443, 8888, 9000, 9090, 9200, 9300, 9999,
    10000, 11211, 27017, 27018, 50050, 50051,
];

/// First and last port of the contiguous high block appended to `TOP_PORTS`.
const TOP_PORTS_HIGH_BLOCK: (u16, u16) = (60001, 60200);

/// Which ports to scan on every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSelection {
    /// A contiguous inclusive range.
    Range(PortRange),
    /// The fixed well-known-port list.
    Top,
}

impl PortSelection {
    /// Expand the selection into concrete ports.
    pub fn ports(&self) -> Vec<Port> {
        match self {
            Self::Range(range) => range.iter().collect(),
            Self::Top => {
                let (lo, hi) = TOP_PORTS_HIGH_BLOCK;
                TOP_PORTS
                    .iter()
                    .copied()
                    .chain(lo..=hi)
                    .map(Port)
                    .collect()
            }
        }
    }
}

impl Default for PortSelection {
    fn default() -> Self {
        Self::Range(PortRange::full())
    }
}

impl fmt::Display for PortSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(range) => write!(f, "{}", range),
            Self::Top => write!(f, "top ports"),
        }
    }
}
