//! Per-port seed payloads.
//!
//! Some services stay quiet until the client speaks first. A seed is a
//! fixed byte sequence written right after connecting, chosen by port
//! number alone. Nothing checks that the service really speaks the hinted
//! protocol; an FTP greeting goes to every port 21.

use std::collections::BTreeMap;

/// Built-in seeds.
const DEFAULT_SEEDS: &[(u16, &[u8])] = &[
    (21, b"USER anonymous\r\n"),
    (3306, b"\x03SELECT VERSION();"),
];

/// Mapping from port to the bytes written before probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedTable {
    seeds: BTreeMap<u16, Vec<u8>>,
}

impl SeedTable {
    /// A table with no seeds at all.
    pub fn empty() -> Self {
        Self {
            seeds: BTreeMap::new(),
        }
    }

    /// Seed bytes for `port`, if any.
    pub fn get(&self, port: u16) -> Option<&[u8]> {
        self.seeds.get(&port).map(Vec::as_slice)
    }

    /// Set the seed for a port. An empty payload removes it.
    pub fn set(&mut self, port: u16, payload: impl Into<Vec<u8>>) {
        let payload = payload.into();
        if payload.is_empty() {
            self.seeds.remove(&port);
        } else {
            self.seeds.insert(port, payload);
        }
    }

    /// Apply overrides on top of this table.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (u16, &'a str)>,
    {
        for (port, payload) in overrides {
            self.set(port, payload.as_bytes());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

impl Default for SeedTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for &(port, payload) in DEFAULT_SEEDS {
            table.set(port, payload);
        }
        table
    }
}
