//! Cache parameter bags

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const DEFAULT_TTL_SECS: u64 = 3600;

/// Read hint asking the store to restart an entry's TTL when it is read
pub const REFRESH_TTL_HINT: &str = "refresh_ttl";

/// How identifier-scoped lookups read the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStrategy {
    /// One entry per identifier set; a miss refetches the whole set
    #[default]
    Whole,
    /// One entry per identifier; only missing identifiers are refetched
    PerRecord,
}

impl std::fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Whole => write!(f, "whole"),
            Self::PerRecord => write!(f, "per_record"),
        }
    }
}

impl std::str::FromStr for ReadStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whole" | "combined" => Ok(Self::Whole),
            "per_record" | "perrecord" | "multi" => Ok(Self::PerRecord),
            _ => Err(DomainError::validation(format!(
                "Unknown cache read strategy: {}. Valid strategies: whole, per_record",
                s
            ))),
        }
    }
}

/// Parameters forwarded to the cache store for reads or writes
#[derive(Debug, Clone, PartialEq)]
pub struct CacheParams {
    pub ttl: Duration,
    pub read_strategy: ReadStrategy,
    /// Remaining hints, kept verbatim
    pub hints: BTreeMap<String, String>,
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            read_strategy: ReadStrategy::default(),
            hints: BTreeMap::new(),
        }
    }
}

impl CacheParams {
    /// Resolves a string hint bag once, at configuration time
    ///
    /// `strategy` and `ttl_secs` become typed fields; every other hint is
    /// kept as-is.
    pub fn from_hints<'a, I>(hints: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut params = Self::default();

        for (key, value) in hints {
            match key.as_str() {
                "strategy" => params.read_strategy = value.parse()?,
                "ttl_secs" => {
                    let secs: u64 = value.parse().map_err(|_| {
                        DomainError::validation(format!("Invalid ttl_secs hint: {}", value))
                    })?;
                    params.ttl = Duration::from_secs(secs);
                }
                _ => {
                    params.hints.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(params)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.read_strategy = strategy;
        self
    }

    pub fn with_hint(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(name.into(), value.into());
        self
    }

    pub fn hint(&self, name: &str) -> Option<&str> {
        self.hints.get(name).map(String::as_str)
    }

    /// Whether a read should restart the entry's TTL with `ttl`
    pub fn refreshes_ttl(&self) -> bool {
        self.hint(REFRESH_TTL_HINT)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}
