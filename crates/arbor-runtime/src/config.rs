#![forbid(unsafe_code)]

//! Store and source configuration.
//!
//! # Env Var Contract
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ARBOR_TREE_DATA_URL` | [`DEFAULT_TREE_DATA_URL`] |
//! | `ARBOR_ENTRY_DATA_URL` | [`DEFAULT_ENTRY_DATA_URL`] |
//! | `ARBOR_LEAF_ERROR_TTL_MS` | `3000` |
//!
//! [`StoreConfig::from_env`] falls back to the default for any value it
//! cannot parse (logged at `warn`). [`StoreConfig::try_from_env`] reports it
//! as a [`ConfigError`] instead.

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_TREE_DATA_URL: &str = "https://ubique.img.ly/frontend-tha/data.json";
pub const DEFAULT_ENTRY_DATA_URL: &str = "https://ubique.img.ly/frontend-tha/entries/";
pub const DEFAULT_LEAF_ERROR_TTL: Duration = Duration::from_millis(3000);

const ENV_TREE_URL: &str = "ARBOR_TREE_DATA_URL";
const ENV_ENTRY_URL: &str = "ARBOR_ENTRY_DATA_URL";
const ENV_LEAF_ERROR_TTL: &str = "ARBOR_LEAF_ERROR_TTL_MS";

/// Where tree and leaf payloads live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Location of the whole-tree payload.
    pub tree_url: String,
    /// Prefix for leaf payloads; a leaf lives at `{entry_base_url}{id}.json`.
    pub entry_base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            tree_url: DEFAULT_TREE_DATA_URL.to_owned(),
            entry_base_url: DEFAULT_ENTRY_DATA_URL.to_owned(),
        }
    }
}

impl SourceConfig {
    #[must_use]
    pub fn new(tree_url: impl Into<String>, entry_base_url: impl Into<String>) -> Self {
        Self {
            tree_url: tree_url.into(),
            entry_base_url: entry_base_url.into(),
        }
    }

    /// Location of the payload for leaf `id`.
    #[must_use]
    pub fn entry_url(&self, id: &str) -> String {
        format!("{}{id}.json", self.entry_base_url)
    }
}

/// Configuration for [`TreeStore`](crate::store::TreeStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// How long a leaf fetch error stays visible before it is cleared.
    pub leaf_error_ttl: Duration,
    pub source: SourceConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            leaf_error_ttl: DEFAULT_LEAF_ERROR_TTL,
            source: SourceConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Set the leaf error display time.
    #[must_use]
    pub fn with_leaf_error_ttl(mut self, ttl: Duration) -> Self {
        self.leaf_error_ttl = ttl;
        self
    }

    /// Set the source locations.
    #[must_use]
    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = source;
        self
    }

    /// Read the process environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the process environment, rejecting bad values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut config = defaults.clone();

        match url_var(&lookup, ENV_TREE_URL) {
            Ok(Some(url)) => config.source.tree_url = url,
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "ignoring tree url override"),
        }
        match url_var(&lookup, ENV_ENTRY_URL) {
            Ok(Some(url)) => config.source.entry_base_url = url,
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "ignoring entry url override"),
        }
        match ttl_var(&lookup) {
            Ok(Some(ttl)) => config.leaf_error_ttl = ttl,
            Ok(None) => {}
            Err(err) => tracing::warn!(
                error = %err,
                default_ms = defaults.leaf_error_ttl.as_millis() as u64,
                "ignoring leaf error ttl override"
            ),
        }
        config
    }

    /// Like [`try_from_env`](Self::try_from_env) with a custom variable lookup.
    pub fn try_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = url_var(&lookup, ENV_TREE_URL)? {
            config.source.tree_url = url;
        }
        if let Some(url) = url_var(&lookup, ENV_ENTRY_URL)? {
            config.source.entry_base_url = url;
        }
        if let Some(ttl) = ttl_var(&lookup)? {
            config.leaf_error_ttl = ttl;
        }
        Ok(config)
    }
}

fn url_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(value) => Ok(Some(value.trim().to_owned())),
    }
}

fn ttl_var(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = lookup(ENV_LEAF_ERROR_TTL) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<u64>()
        .map(|ms| Some(Duration::from_millis(ms)))
        .map_err(|_| ConfigError::InvalidValue {
            var: ENV_LEAF_ERROR_TTL,
            value,
        })
}
