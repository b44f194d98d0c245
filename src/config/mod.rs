//! # Database Configuration
//!
//! This module implements the configuration surface of the engine: a static,
//! enumerable registry of recognized option names and a flat string-keyed
//! option map validated at set-time.
//!
//! ## Design
//!
//! - The registry is a compile-time table of `(name, description)` pairs.
//!   Hosts enumerate it with [`config_count`] / [`config_flag`] to discover
//!   what the engine understands; there is no mutable global state.
//! - [`Config::set`] validates both the key (membership in the registry, via
//!   a perfect hash table) and the value (per-option parser) before touching
//!   the map. A failed set leaves the configuration unchanged — there is no
//!   partial application.
//!
//! ## Recognized Options
//!
//! | Option | Values |
//! |--------|--------|
//! | `access_mode` | `automatic`, `read_only`, `read_write` |
//! | `threads` | positive integer |
//! | `max_memory` | byte count with optional `KB`/`MB`/`GB`/`TB` suffix |
//! | `default_order` | `asc`, `desc` |
//! | `enable_object_cache` | boolean |
//! | `preserve_insertion_order` | boolean |

pub mod constants;

pub use constants::*;

use eyre::{bail, ensure, Result};
use hashbrown::HashMap;
use phf::phf_map;

/// One recognized configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigFlag {
    pub name: &'static str,
    pub description: &'static str,
}

/// The static registry of recognized options, in enumeration order.
pub static CONFIG_FLAGS: &[ConfigFlag] = &[
    ConfigFlag {
        name: "access_mode",
        description: "Access mode of the database (automatic, read_only or read_write)",
    },
    ConfigFlag {
        name: "threads",
        description: "The number of threads used by the engine",
    },
    ConfigFlag {
        name: "max_memory",
        description: "The maximum memory of the engine (e.g. 1GB)",
    },
    ConfigFlag {
        name: "default_order",
        description: "The order type used when none is specified (asc or desc)",
    },
    ConfigFlag {
        name: "enable_object_cache",
        description: "Whether or not object cache is used to cache e.g. scanned files",
    },
    ConfigFlag {
        name: "preserve_insertion_order",
        description: "Whether or not the insertion order of rows should be preserved",
    },
];

static FLAG_INDEX: phf::Map<&'static str, usize> = phf_map! {
    "access_mode" => 0,
    "threads" => 1,
    "max_memory" => 2,
    "default_order" => 3,
    "enable_object_cache" => 4,
    "preserve_insertion_order" => 5,
};

/// Returns the number of recognized configuration options.
pub fn config_count() -> usize {
    CONFIG_FLAGS.len()
}

/// Returns the registry entry at `index`.
pub fn config_flag(index: usize) -> Result<&'static ConfigFlag> {
    CONFIG_FLAGS
        .get(index)
        .ok_or_else(|| eyre::eyre!("config flag index {index} out of range"))
}

/// Access mode a database instance is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    Automatic,
    ReadOnly,
    ReadWrite,
}

/// A validated, flat string-keyed option map.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value` after validating both.
    ///
    /// Unknown names and malformed values fail immediately, leaving the map
    /// untouched.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        ensure!(
            FLAG_INDEX.contains_key(name),
            "unrecognized configuration option '{name}'"
        );
        match name {
            "access_mode" => {
                parse_access_mode(value)?;
            }
            "threads" => {
                let threads: usize = value
                    .parse()
                    .map_err(|_| eyre::eyre!("invalid thread count '{value}'"))?;
                ensure!(threads > 0, "thread count must be positive, got {threads}");
            }
            "max_memory" => {
                parse_size(value)?;
            }
            "default_order" => {
                let order = value.to_ascii_lowercase();
                ensure!(
                    matches!(order.as_str(), "asc" | "desc"),
                    "invalid default order '{value}': expected asc or desc"
                );
            }
            "enable_object_cache" | "preserve_insertion_order" => {
                parse_bool(value)?;
            }
            _ => unreachable!("option '{name}' is in the registry but has no validator"),
        }
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Returns the raw string value of an option, if it has been set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn access_mode(&self) -> AccessMode {
        self.get("access_mode")
            .and_then(|v| parse_access_mode(v).ok())
            .unwrap_or_default()
    }

    pub fn threads(&self) -> usize {
        self.get("threads").and_then(|v| v.parse().ok()).unwrap_or(1)
    }

    pub fn max_memory_bytes(&self) -> Option<u64> {
        self.get("max_memory").and_then(|v| parse_size(v).ok())
    }
}

fn parse_access_mode(value: &str) -> Result<AccessMode> {
    match value.to_ascii_lowercase().as_str() {
        "automatic" => Ok(AccessMode::Automatic),
        "read_only" => Ok(AccessMode::ReadOnly),
        "read_write" => Ok(AccessMode::ReadWrite),
        _ => bail!("invalid access mode '{value}': expected automatic, read_only or read_write"),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        _ => bail!("invalid boolean '{value}'"),
    }
}

/// Parses a byte size such as `1024`, `512KB` or `2GB`.
fn parse_size(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    ensure!(!trimmed.is_empty(), "empty size value");

    let upper = trimmed.to_ascii_uppercase();
    let (digits, multiplier) = if let Some(rest) = upper.strip_suffix("TB") {
        (rest, 1u64 << 40)
    } else if let Some(rest) = upper.strip_suffix("GB") {
        (rest, 1u64 << 30)
    } else if let Some(rest) = upper.strip_suffix("MB") {
        (rest, 1u64 << 20)
    } else if let Some(rest) = upper.strip_suffix("KB") {
        (rest, 1u64 << 10)
    } else if let Some(rest) = upper.strip_suffix('B') {
        (rest, 1)
    } else {
        (upper.as_str(), 1)
    };

    let count: u64 = digits
        .trim()
        .parse()
        .map_err(|_| eyre::eyre!("invalid size '{value}'"))?;
    count
        .checked_mul(multiplier)
        .ok_or_else(|| eyre::eyre!("size '{value}' overflows"))
}
