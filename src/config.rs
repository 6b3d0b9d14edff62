//! Run configuration, read from JSON or from `EVOAI_*` environment variables.

use crate::{constants::*, error::Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub population_size: usize,
    pub generations: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population_size: EVOAI_POPULATION,
            generations: EVOAI_GENERATIONS,
            seed: EVOAI_SEED,
        }
    }
}

impl FromStr for Config {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Parse `key` from `lookup`, keeping `default` when it's unset or unreadable
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring unreadable environment variable");
            default
        }),
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    /// Defaults, overridden by `EVOAI_POPULATION`, `EVOAI_GENERATIONS` and `EVOAI_SEED`
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            population_size: parse_var(&lookup, "EVOAI_POPULATION", default.population_size),
            generations: parse_var(&lookup, "EVOAI_GENERATIONS", default.generations),
            seed: parse_var(&lookup, "EVOAI_SEED", default.seed),
        }
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
