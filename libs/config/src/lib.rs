//! # Basin Centralized Configuration
//!
//! Operator-facing constants for all Basin services: protocol fee and default
//! slippage tolerance in basis points, transaction validity window, I/O
//! timeouts, and the external venue endpoint map. Loaded from a TOML file
//! with environment-variable overrides, validated before use.
//!
//! Services receive a validated `BasinConfig` at construction; nothing reads
//! the environment after startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete configuration for a Basin process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasinConfig {
    /// Protocol fee in basis points, deducted from the input before pricing.
    pub default_fee_bps: u16,
    /// Default slippage tolerance in basis points when a request omits one.
    pub default_slippage_bps: u16,
    /// How long a prepared transaction stays valid, in seconds.
    pub tx_validity_secs: u64,
    /// Timeout applied to every ledger read and external venue quote, in ms.
    pub io_timeout_ms: u64,
    /// External venue identifier -> endpoint URL.
    pub venues: BTreeMap<String, String>,
}

impl Default for BasinConfig {
    fn default() -> Self {
        Self {
            default_fee_bps: 30,
            default_slippage_bps: 50,
            tx_validity_secs: 120,
            io_timeout_ms: 5_000,
            venues: BTreeMap::new(),
        }
    }
}

impl BasinConfig {
    /// Load from a TOML file, apply environment overrides, validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: BasinConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        info!(
            fee_bps = config.default_fee_bps,
            slippage_bps = config.default_slippage_bps,
            venues = config.venues.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Defaults plus environment overrides, for processes run without a file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse("BASIN_FEE_BPS") {
            self.default_fee_bps = v;
        }
        if let Some(v) = env_parse("BASIN_SLIPPAGE_BPS") {
            self.default_slippage_bps = v;
        }
        if let Some(v) = env_parse("BASIN_TX_VALIDITY_SECS") {
            self.tx_validity_secs = v;
        }
        if let Some(v) = env_parse("BASIN_IO_TIMEOUT_MS") {
            self.io_timeout_ms = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_fee_bps >= 10_000 {
            return Err(ConfigError::Invalid(format!(
                "default_fee_bps {} must be below 10000",
                self.default_fee_bps
            )));
        }
        if self.default_slippage_bps > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "default_slippage_bps {} must be at most 10000",
                self.default_slippage_bps
            )));
        }
        if self.io_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "io_timeout_ms must be positive".to_string(),
            ));
        }
        for (id, endpoint) in &self.venues {
            if id.is_empty() || endpoint.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "venue entry '{id}' has an empty id or endpoint"
                )));
            }
        }
        Ok(())
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}
