//! Configuration management for skulk.
//!
//! Provides XDG-compliant settings storage with defaults for every flag.

mod settings;

pub use settings::{AppSettings, Paths};
