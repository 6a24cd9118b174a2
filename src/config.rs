//! Service configuration.
//!
//! Everything needed to provision and address one collection: connection
//! parameters for the backing store, the vector policy knobs, capacity, and
//! the default result count. Configurations are serde-friendly and can be
//! loaded from YAML files.
//!
//! ## Example YAML
//!
//! ```yaml
//! endpoint: "https://pantry-store.example.net:443/"
//! key: "${PANTRY_STORE_KEY}"
//! database: "pantry"
//! collection: "recipes"
//! embedding_dimensions: 8
//! distance_function: cosine
//! throughput_rus: 400
//! default_top_k: 3
//! consistency: eventual
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use store::DistanceFunction;
use thiserror::Error;

/// Errors that can occur when loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Consistency level requested from the backing store's client.
///
/// Informational for the store: relaxed consistency means a search
/// immediately after an ingest may not observe the new documents. This
/// system never compensates for that window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyMode {
    #[default]
    Eventual,
    Session,
    Strong,
}

/// Connection and collection parameters for one provisioned service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Store endpoint URL. Ignored by embedded stores.
    #[serde(default)]
    pub endpoint: String,

    /// Store credential. Ignored by embedded stores.
    #[serde(default)]
    pub key: String,

    pub database: String,

    pub collection: String,

    #[serde(default = "default_dimensions")]
    pub embedding_dimensions: usize,

    #[serde(default)]
    pub distance_function: DistanceFunction,

    /// Manual capacity in request units per second. Never autoscaled.
    #[serde(default = "default_throughput")]
    pub throughput_rus: u32,

    /// Result count used by searches that do not pass an explicit `k`.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default)]
    pub consistency: ConsistencyMode,
}

impl ServiceConfig {
    /// Minimal configuration addressing `database`/`collection` with the
    /// default vector policy.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            endpoint: String::new(),
            key: String::new(),
            database: database.into(),
            collection: collection.into(),
            embedding_dimensions: default_dimensions(),
            distance_function: DistanceFunction::default(),
            throughput_rus: default_throughput(),
            default_top_k: default_top_k(),
            consistency: ConsistencyMode::default(),
        }
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.embedding_dimensions = dimensions;
        self
    }

    pub fn with_distance_function(mut self, function: DistanceFunction) -> Self {
        self.distance_function = function;
        self
    }

    /// Load a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database must not be empty".to_string(),
            ));
        }
        if self.collection.trim().is_empty() {
            return Err(ConfigError::Validation(
                "collection must not be empty".to_string(),
            ));
        }
        if self.embedding_dimensions == 0 {
            return Err(ConfigError::Validation(
                "embedding_dimensions must be >= 1".to_string(),
            ));
        }
        if self.default_top_k == 0 {
            return Err(ConfigError::Validation(
                "default_top_k must be >= 1".to_string(),
            ));
        }
        if self.throughput_rus < MIN_THROUGHPUT_RUS {
            return Err(ConfigError::Validation(format!(
                "throughput_rus must be >= {MIN_THROUGHPUT_RUS}"
            )));
        }
        Ok(())
    }
}

/// Smallest manual capacity a collection can be provisioned with.
pub const MIN_THROUGHPUT_RUS: u32 = 400;

// Helper functions for serde defaults
fn default_dimensions() -> usize {
    8
}
fn default_throughput() -> u32 {
    400
}
fn default_top_k() -> usize {
    3
}
