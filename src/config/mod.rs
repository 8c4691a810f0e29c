// SPDX-License-Identifier: MIT
// config/mod.rs — Daemon configuration.
//
// Layered the usual way: built-in defaults, then `config.toml` in the data
// dir, then CLI/env overrides applied by main.rs.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::orders::workflow::TransitionPolicy;

const DEFAULT_PORT: u16 = 4410;
const DEFAULT_SHIPPING_REGULAR: i64 = 10_000;
const DEFAULT_SHIPPING_EXPRESS: i64 = 25_000;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── ShippingConfig ──────────────────────────────────────────────────────────

/// Flat shipping rates in rupiah (`[shipping]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShippingConfig {
    pub regular: i64,
    pub express: i64,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            regular: DEFAULT_SHIPPING_REGULAR,
            express: DEFAULT_SHIPPING_EXPRESS,
        }
    }
}

// ─── OrdersConfig ────────────────────────────────────────────────────────────

/// Order workflow tuning (`[orders]` in config.toml).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Which admin status transitions are legal: "linear" (default) or
    /// "any" (the historical unvalidated behavior).
    pub transition_policy: TransitionPolicy,
}

// ─── StoreConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// REST API port.
    pub port: u16,
    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access).
    pub bind_address: String,
    /// Data directory for the SQLite database, config, and admin token.
    pub data_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error).
    pub log: String,
    /// Optional log file path (rotated daily).
    pub log_file: Option<PathBuf>,
    pub shipping: ShippingConfig,
    pub orders: OrdersConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: default_bind_address(),
            data_dir: default_data_dir(),
            log: "info".to_string(),
            log_file: None,
            shipping: ShippingConfig::default(),
            orders: OrdersConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load config.toml from the data dir, falling back to defaults when the
    /// file is missing. A malformed file is reported on stderr and ignored
    /// rather than taking the daemon down. Runs before the tracing
    /// subscriber is installed, hence eprintln rather than warn!.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.toml");
        if !path.exists() {
            let mut config = Self::default();
            config.data_dir = data_dir.to_path_buf();
            return Ok(config);
        }
        let raw = std::fs::read_to_string(&path)?;
        let mut config: Self = match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warn: invalid config.toml, using defaults: {e}");
                Self::default()
            }
        };
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".butikd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.shipping.regular, 10_000);
        assert_eq!(config.orders.transition_policy, TransitionPolicy::Linear);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
            port = 5000
            [shipping]
            express = 30000
            [orders]
            transition_policy = "any"
            "#,
        )
        .unwrap();
        let config = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.shipping.express, 30_000);
        assert_eq!(config.shipping.regular, 10_000);
        assert_eq!(config.orders.transition_policy, TransitionPolicy::Any);
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = \"not a number").unwrap();
        let config = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, dir.path());
    }
}
