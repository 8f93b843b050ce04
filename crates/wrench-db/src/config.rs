//! # Shop Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WRENCH_DB_PATH=/srv/wrench/wrench.db                               │
//! │     WRENCH_TAX1_RATE=0.05                                              │
//! │     WRENCH_TAX2_RATE=0.09975                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/wrench-pos/wrench.toml (Linux)                           │
//! │     or an explicit path                                                │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     TPS 0.05, TVQ 0.09975, wrench.db in the data dir                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [shop]
//! name = "Vélo Atelier"
//! address = "123 rue Rachel, Montréal"
//!
//! [database]
//! path = "/srv/wrench/wrench.db"
//! max_connections = 5
//!
//! [[taxes]]
//! name = "TPS"
//! rate = "0.05"
//!
//! [[taxes]]
//! name = "TVQ"
//! rate = "0.09975"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use wrench_core::{TaxConfig, ValidationError};

use crate::pool::DbConfig;

const CONFIG_FILE_NAME: &str = "wrench.toml";
const DATABASE_FILE_NAME: &str = "wrench.db";

// =============================================================================
// Errors
// =============================================================================

/// Configuration load and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {key}: {source}")]
    Invalid {
        key: String,
        #[source]
        source: ValidationError,
    },

    #[error("Expected exactly 2 taxes, found {0}")]
    TaxCount(usize),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[shop]`: printed on invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSection {
    #[serde(default = "default_shop_name")]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

fn default_shop_name() -> String {
    "Wrench POS".to_string()
}

impl Default for ShopSection {
    fn default() -> Self {
        ShopSection {
            name: default_shop_name(),
            address: String::new(),
        }
    }
}

/// `[database]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// Defaults to `wrench.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// One `[[taxes]]` entry. The rate stays a string so it is never a float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxEntry {
    pub name: String,
    pub rate: String,
}

fn default_taxes() -> Vec<TaxEntry> {
    vec![
        TaxEntry {
            name: "TPS".to_string(),
            rate: "0.05".to_string(),
        },
        TaxEntry {
            name: "TVQ".to_string(),
            rate: "0.09975".to_string(),
        },
    ]
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete shop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default)]
    pub shop: ShopSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default = "default_taxes")]
    pub taxes: Vec<TaxEntry>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            shop: ShopSection::default(),
            database: DatabaseSection::default(),
            taxes: default_taxes(),
        }
    }
}

impl ShopConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`wrench.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading shop config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `WRENCH_*` overrides read through `var`.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("WRENCH_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        for (index, key) in ["WRENCH_TAX1_RATE", "WRENCH_TAX2_RATE"].iter().enumerate() {
            if let (Some(rate), Some(entry)) = (var(key), self.taxes.get_mut(index)) {
                debug!(key = *key, rate = %rate, "Overriding tax rate from environment");
                entry.rate = rate;
            }
        }
    }

    /// Checks the tax table. Everything else has usable defaults.
    pub fn validate(&self) -> ConfigResult<()> {
        self.tax_config().map(|_| ())
    }

    /// The two configured taxes as a pricing value.
    pub fn tax_config(&self) -> ConfigResult<TaxConfig> {
        if self.taxes.len() != 2 {
            return Err(ConfigError::TaxCount(self.taxes.len()));
        }
        let pairs: Vec<(&str, &str)> = self
            .taxes
            .iter()
            .map(|t| (t.name.as_str(), t.rate.as_str()))
            .collect();
        TaxConfig::from_pairs(&pairs).map_err(|source| ConfigError::Invalid {
            key: "taxes".to_string(),
            source,
        })
    }

    /// Configured database file, or `wrench.db` in the data dir.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).max_connections(self.database.max_connections)
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "wrench", "wrench-pos")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ShopConfig::default();
        let taxes = config.tax_config().unwrap();
        assert_eq!(taxes.tax1.name, "TPS");
        assert_eq!(taxes.tax2.rate.rate(), dec!(0.09975));
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database_path().ends_with("wrench.db"));
    }

    #[test]
    fn test_parse_toml() {
        let config = ShopConfig::from_toml(
            r#"
            [shop]
            name = "Vélo Atelier"

            [database]
            path = "/tmp/shop.db"

            [[taxes]]
            name = "GST"
            rate = "0.05"

            [[taxes]]
            name = "PST"
            rate = "0.07"
            "#,
        )
        .unwrap();

        assert_eq!(config.shop.name, "Vélo Atelier");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.tax_config().unwrap().tax2.name, "PST");
    }

    #[test]
    fn test_tax_validation() {
        let mut config = ShopConfig::default();
        config.taxes.pop();
        assert!(matches!(config.validate(), Err(ConfigError::TaxCount(1))));

        let mut config = ShopConfig::default();
        config.taxes[0].rate = "0.123456789".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        config.taxes[0].rate = "1.5".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("WRENCH_DB_PATH", "/data/override.db"),
            ("WRENCH_TAX2_RATE", "0.08"),
        ]
        .into_iter()
        .collect();

        let mut config = ShopConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/data/override.db"));
        let taxes = config.tax_config().unwrap();
        assert_eq!(taxes.tax1.rate.rate(), dec!(0.05));
        assert_eq!(taxes.tax2.rate.rate(), dec!(0.08));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ShopConfig::from_toml("[[taxes]]\nname = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
