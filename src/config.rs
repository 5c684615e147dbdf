//! Engine configuration file support.
//!
//! All tunables carry defaults matching production, so an absent file or a
//! partial one is always usable. Configuration is read once at startup and
//! passed into the engine; nothing reads it globally.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::{EngineError, EngineResult};

/// Engine configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub sheets: SheetSettings,
    #[serde(default)]
    pub membership: MembershipSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub geocode: GeocodeSettings,
}

/// Sheet title settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSettings {
    #[serde(default = "default_roster_sheet")]
    pub roster: String,
    #[serde(default = "default_payments_sheet")]
    pub payments: String,
    #[serde(default = "default_manual_payments_sheet")]
    pub manual_payments: String,
}

/// Classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipSettings {
    /// Minimum amount for the heuristic to count a payment as a membership
    /// fee when no explicit classification is recorded.
    #[serde(default = "default_fee_threshold")]
    pub fee_threshold: f64,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Retry settings for rate-limited upstream calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Geocoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeSettings {
    /// Minimum spacing between consecutive geocoder calls.
    #[serde(default = "default_geocode_delay_ms")]
    pub delay_ms: u64,
}

fn default_roster_sheet() -> String {
    "CLEAN".to_string()
}

fn default_payments_sheet() -> String {
    "PAYMENTS".to_string()
}

fn default_manual_payments_sheet() -> String {
    "MANUAL_PAYMENTS".to_string()
}

fn default_fee_threshold() -> f64 {
    25.0
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_geocode_delay_ms() -> u64 {
    200
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            roster: default_roster_sheet(),
            payments: default_payments_sheet(),
            manual_payments: default_manual_payments_sheet(),
        }
    }
}

impl Default for MembershipSettings {
    fn default() -> Self {
        Self {
            fee_threshold: default_fee_threshold(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_geocode_delay_ms(),
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: EngineConfig = toml::from_str(&content).map_err(|e| {
            EngineError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `engine.toml` in the current directory and its parent;
    /// falls back to built-in defaults when no file exists.
    pub fn from_default_location() -> EngineResult<Self> {
        let search_paths = vec![
            PathBuf::from("engine.toml"),
            PathBuf::from("../engine.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_production() {
        let config = EngineConfig::default();
        assert_eq!(config.sheets.roster, "CLEAN");
        assert_eq!(config.sheets.payments, "PAYMENTS");
        assert_eq!(config.sheets.manual_payments, "MANUAL_PAYMENTS");
        assert_eq!(config.membership.fee_threshold, 25.0);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.sweep_interval_secs, 60);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.geocode.delay_ms, 200);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let toml = r#"
[membership]
fee_threshold = 30.0

[sheets]
roster = "MEMBERS"
"#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.membership.fee_threshold, 30.0);
        assert_eq!(config.sheets.roster, "MEMBERS");
        assert_eq!(config.sheets.payments, "PAYMENTS");
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn from_file_reads_a_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retry]\nmax_attempts = 5").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn unreadable_file_is_a_configuration_error() {
        let result = EngineConfig::from_file("/nonexistent/engine.toml");
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }
}
