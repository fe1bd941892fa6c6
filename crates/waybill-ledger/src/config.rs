//! Ledger configuration
//!
//! Defaults, then an optional TOML or JSON file, then `WAYBILL_*` environment
//! variables. Call [`LedgerConfig::validate`] after merging.

use serde::{Deserialize, Serialize};
use std::path::Path;
use waybill_core::{Result, WaybillError};

/// Default freshness bound for commit timestamps
pub const DEFAULT_FRESHNESS_WINDOW_MS: u64 = 60_000;

/// Environment variable overriding [`LedgerConfig::freshness_window_ms`]
pub const ENV_FRESHNESS_WINDOW_MS: &str = "WAYBILL_FRESHNESS_WINDOW_MS";

/// Environment variable overriding [`LedgerConfig::revalidate_routes`]
pub const ENV_REVALIDATE_ROUTES: &str = "WAYBILL_REVALIDATE_ROUTES";

/// Tunables for [`crate::DeliveryLedger`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Largest allowed distance between a commit timestamp and the clock
    pub freshness_window_ms: u64,
    /// Re-run route validation on stored routes before submit and commit
    pub revalidate_routes: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            freshness_window_ms: DEFAULT_FRESHNESS_WINDOW_MS,
            revalidate_routes: true,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a `.toml` or `.json` file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WaybillError::config(format!("Failed to read config file: {e}")))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| WaybillError::config(format!("Invalid TOML: {e}"))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| WaybillError::config(format!("Invalid JSON: {e}"))),
            _ => Err(WaybillError::config("Unsupported file format")),
        }
    }

    /// Apply `WAYBILL_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `WAYBILL_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            match key.as_ref() {
                ENV_FRESHNESS_WINDOW_MS => {
                    self.set_from_string("freshness_window_ms", value.as_ref())?;
                }
                ENV_REVALIDATE_ROUTES => {
                    self.set_from_string("revalidate_routes", value.as_ref())?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Set a single value by name
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "freshness_window_ms" | "freshness-window-ms" => {
                self.freshness_window_ms = value.parse().map_err(|_| {
                    WaybillError::config(format!("Invalid freshness window: {value}"))
                })?;
            }
            "revalidate_routes" | "revalidate-routes" => {
                self.revalidate_routes = value.parse().map_err(|_| {
                    WaybillError::config(format!("Invalid boolean for revalidate_routes: {value}"))
                })?;
            }
            _ => {
                return Err(WaybillError::config(format!(
                    "Unknown configuration key: {key}"
                )))
            }
        }
        Ok(())
    }

    /// Check the merged configuration
    pub fn validate(&self) -> Result<()> {
        if self.freshness_window_ms == 0 {
            return Err(WaybillError::config("Freshness window cannot be 0"));
        }
        Ok(())
    }
}
