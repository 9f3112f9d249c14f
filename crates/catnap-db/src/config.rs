//! Engine configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                          | Default       |
//! |-----------------------------------|---------------|
//! | `CATNAP_DATABASE_PATH`            | `./catnap.db` |
//! | `CATNAP_MAX_CONNECTIONS`          | `5`           |
//! | `CATNAP_LOCK_TIMEOUT_MS`          | `5000`        |
//! | `CATNAP_UNIT_OF_WORK_TIMEOUT_MS`  | `10000`       |
//! | `CATNAP_PAYMENT_TOLERANCE_CENTS`  | `1` (0 or 1)  |
//! | `CATNAP_PENDING_BLOCKS`           | `false`       |

use catnap_core::{HoldPolicy, Money, PAYMENT_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::engine::EngineSettings;
use crate::pool::DbConfig;

/// Booking engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits for another writer's lock
    pub lock_timeout_ms: u64,

    /// Deadline for a whole unit of work
    pub unit_of_work_timeout_ms: u64,

    /// Allowed difference between a payment and the booking total
    pub payment_tolerance_cents: i64,

    /// Whether pending bookings block rooms
    pub pending_blocks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_path: "./catnap.db".to_string(),
            max_connections: 5,
            lock_timeout_ms: 5_000,
            unit_of_work_timeout_ms: 10_000,
            payment_tolerance_cents: 1,
            pending_blocks: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup.
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            database_path: lookup("CATNAP_DATABASE_PATH").unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "CATNAP_MAX_CONNECTIONS", defaults.max_connections)?,

            lock_timeout_ms: parse_or(&lookup, "CATNAP_LOCK_TIMEOUT_MS", defaults.lock_timeout_ms)?,

            unit_of_work_timeout_ms: parse_or(
                &lookup,
                "CATNAP_UNIT_OF_WORK_TIMEOUT_MS",
                defaults.unit_of_work_timeout_ms,
            )?,

            payment_tolerance_cents: parse_or(
                &lookup,
                "CATNAP_PAYMENT_TOLERANCE_CENTS",
                defaults.payment_tolerance_cents,
            )?,

            pending_blocks: parse_or(&lookup, "CATNAP_PENDING_BLOCKS", defaults.pending_blocks)?,
        };

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("CATNAP_DATABASE_PATH".to_string()));
        }
        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("CATNAP_MAX_CONNECTIONS".to_string()));
        }
        if config.unit_of_work_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "CATNAP_UNIT_OF_WORK_TIMEOUT_MS".to_string(),
            ));
        }
        if !(0..=PAYMENT_TOLERANCE.cents()).contains(&config.payment_tolerance_cents) {
            return Err(ConfigError::InvalidValue(
                "CATNAP_PAYMENT_TOLERANCE_CENTS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.lock_timeout_ms))
    }

    /// Engine settings.
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            unit_of_work_timeout: Duration::from_millis(self.unit_of_work_timeout_ms),
            payment_tolerance: Money::from_cents(self.payment_tolerance_cents),
            hold_policy: if self.pending_blocks {
                HoldPolicy::Blocking
            } else {
                HoldPolicy::Provisional
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::load_from(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, EngineConfig::default());

        let settings = config.settings();
        assert_eq!(settings.hold_policy, HoldPolicy::Provisional);
        assert_eq!(settings.payment_tolerance, Money::from_cents(1));
        assert_eq!(settings.unit_of_work_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CATNAP_DATABASE_PATH", "/var/lib/catnap/hotel.db"),
            ("CATNAP_MAX_CONNECTIONS", "12"),
            ("CATNAP_LOCK_TIMEOUT_MS", "250"),
            ("CATNAP_PENDING_BLOCKS", "true"),
        ])
        .unwrap();

        assert_eq!(config.max_connections, 12);
        assert_eq!(config.settings().hold_policy, HoldPolicy::Blocking);

        let db = config.db_config();
        assert_eq!(db.busy_timeout, Duration::from_millis(250));
        assert_eq!(db.database_path.to_str(), Some("/var/lib/catnap/hotel.db"));
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = load(&[("CATNAP_MAX_CONNECTIONS", "lots")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for CATNAP_MAX_CONNECTIONS");

        assert!(load(&[("CATNAP_PAYMENT_TOLERANCE_CENTS", "-5")]).is_err());
        assert!(load(&[("CATNAP_PAYMENT_TOLERANCE_CENTS", "0")]).is_ok());
        assert!(load(&[("CATNAP_UNIT_OF_WORK_TIMEOUT_MS", "0")]).is_err());
        assert!(load(&[("CATNAP_DATABASE_PATH", "  ")]).is_err());
    }

    #[test]
    fn test_tolerance_is_capped_at_rounding() {
        let err = load(&[("CATNAP_PAYMENT_TOLERANCE_CENTS", "500")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "CATNAP_PAYMENT_TOLERANCE_CENTS"));

        let config = load(&[("CATNAP_PAYMENT_TOLERANCE_CENTS", "1")]).unwrap();
        assert_eq!(config.settings().payment_tolerance, Money::from_cents(1));
    }
}
