//! Configuration Module
//!
//! Handles loading cache and harness configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache and profiling harness configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// TTL in milliseconds used by the harness for every `set`
    pub default_ttl_ms: u64,
    /// Number of concurrent harness workers
    pub workers: usize,
    /// Operations performed by each harness worker
    pub ops_per_worker: usize,
    /// Number of distinct keys the harness draws from
    pub key_space: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL_MS` - TTL in milliseconds (default: 5000)
    /// - `BENCH_WORKERS` - Concurrent harness workers (default: 8)
    /// - `BENCH_OPS` - Operations per worker (default: 10000)
    /// - `BENCH_KEY_SPACE` - Distinct harness keys (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_or("CACHE_CAPACITY", defaults.capacity),
            default_ttl_ms: env_or("CACHE_DEFAULT_TTL_MS", defaults.default_ttl_ms),
            workers: env_or("BENCH_WORKERS", defaults.workers),
            ops_per_worker: env_or("BENCH_OPS", defaults.ops_per_worker),
            key_space: env_or("BENCH_KEY_SPACE", defaults.key_space),
        }
    }

    /// Rejects values the cache or the harness cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "CACHE_CAPACITY must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(CacheError::InvalidConfig(
                "BENCH_WORKERS must be at least 1".to_string(),
            ));
        }
        if self.key_space == 0 {
            return Err(CacheError::InvalidConfig(
                "BENCH_KEY_SPACE must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the configured TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_ttl_ms: 5000,
            workers: 8,
            ops_per_worker: 10_000,
            key_space: 2000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.default_ttl_ms, 5000);
        assert_eq!(config.workers, 8);
        assert_eq!(config.ops_per_worker, 10_000);
        assert_eq!(config.key_space, 2000);
        assert_eq!(config.default_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_CAPACITY");
        env::remove_var("CACHE_DEFAULT_TTL_MS");
        env::remove_var("BENCH_WORKERS");
        env::remove_var("BENCH_OPS");
        env::remove_var("BENCH_KEY_SPACE");

        let config = Config::from_env();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.default_ttl_ms, 5000);
        assert_eq!(config.workers, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_zero_values() {
        let config = Config {
            capacity: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = Config {
            key_space: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }
}
