//! Environment-driven configuration for the shop backend.

use thiserror::Error;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS: &str = "SAMPLESHOP_DB_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Backend selection and pool sizing.
///
/// Without a database URL the shop runs on in-memory tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ShopConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_connections = match get(MAX_CONNECTIONS) {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: MAX_CONNECTIONS,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            database_url: get(DATABASE_URL),
            max_connections,
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.database_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_in_memory() {
        let config = ShopConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ShopConfig::default());
        assert!(!config.is_persistent());
    }

    #[test]
    fn reads_url_and_pool_size() {
        let config = ShopConfig::from_lookup(lookup(&[
            (DATABASE_URL, "postgres://localhost/shop"),
            (MAX_CONNECTIONS, "12"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn rejects_zero_or_garbage_pool_size() {
        for raw in ["0", "many"] {
            let err = ShopConfig::from_lookup(lookup(&[(MAX_CONNECTIONS, raw)])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidValue {
                    key: MAX_CONNECTIONS,
                    value: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn blank_url_counts_as_unset() {
        let config = ShopConfig::from_lookup(lookup(&[(DATABASE_URL, "  ")])).unwrap();
        assert!(config.database_url.is_none());
    }
}
