//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use private_blackjack::{
    TableConfig,
    server::BlackjackConfig,
    table::{config::MAX_NUM_DECKS, manager::DEFAULT_SCHEDULER_INTERVAL},
};
use std::{net::SocketAddr, time::Duration};

/// Bind address used when neither `--bind` nor `SERVER_BIND` is given.
pub const DEFAULT_BIND: &str = "0.0.0.0:1243";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Settings shared by every table
    pub table: TableConfig,
    /// Pause between scheduler passes over tables waiting to start
    pub scheduler_interval: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `num_decks_override` - Optional shoe size override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if `SERVER_BIND` is set but isn't a socket address.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        num_decks_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => {
                let raw =
                    std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("{raw:?} is not an IP:PORT address"),
                })?
            }
        };

        let defaults = TableConfig::default();
        let table = TableConfig {
            num_decks: num_decks_override
                .unwrap_or_else(|| parse_env_or("TABLE_NUM_DECKS", defaults.num_decks)),
            starting_balance: parse_env_or("TABLE_STARTING_BALANCE", defaults.starting_balance),
            display_wait: Duration::from_secs(parse_env_or(
                "DISPLAY_WAIT_SECS",
                defaults.display_wait.as_secs(),
            )),
        };

        let scheduler_interval = Duration::from_secs(parse_env_or(
            "SCHEDULER_INTERVAL_SECS",
            DEFAULT_SCHEDULER_INTERVAL.as_secs(),
        ));

        Ok(ServerConfig {
            bind,
            table,
            scheduler_interval,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(reason) = self.table.validate() {
            let var = if self.table.num_decks == 0 || self.table.num_decks > MAX_NUM_DECKS {
                "TABLE_NUM_DECKS"
            } else {
                "TABLE_STARTING_BALANCE"
            };
            return Err(ConfigError::Invalid {
                var: var.to_string(),
                reason,
            });
        }

        if self.scheduler_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "SCHEDULER_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// What the library server needs to run.
    pub fn blackjack(&self) -> BlackjackConfig {
        BlackjackConfig {
            table: self.table.clone(),
            scheduler_interval: self.scheduler_interval,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:1243".parse().unwrap(),
            table: TableConfig::default(),
            scheduler_interval: DEFAULT_SCHEDULER_INTERVAL,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "TABLE_NUM_DECKS".to_string(),
            reason: "Must be positive".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TABLE_NUM_DECKS"));
        assert!(msg.contains("Must be positive"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
        assert_eq!(DEFAULT_BIND.parse::<SocketAddr>().unwrap().port(), 1243);
    }

    #[test]
    fn test_config_validation_no_decks() {
        let mut config = config();
        config.table.num_decks = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "TABLE_NUM_DECKS"));
    }

    #[test]
    fn test_config_validation_balance_below_max_bet() {
        let mut config = config();
        config.table.starting_balance = 4;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { ref var, .. } if var == "TABLE_STARTING_BALANCE")
        );
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let mut config = config();
        config.scheduler_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_win() {
        let bind: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = ServerConfig::from_env(Some(bind), Some(2)).unwrap();
        assert_eq!(config.bind, bind);
        assert_eq!(config.table.num_decks, 2);
        assert_eq!(config.blackjack().table.num_decks, 2);
    }

    #[test]
    fn test_parse_env_or_falls_back() {
        assert_eq!(parse_env_or("PB_SERVER_TEST_UNSET_VARIABLE", 7u32), 7);
    }
}
