//! Session pool configuration.

use std::time::Duration;

use crate::error::SessionError;

/// Configuration for the session pool.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum number of cached sessions.
    pub max_entries: usize,

    /// Absolute freshness window: an entry older than this is a miss
    /// regardless of how recently it was accessed.
    pub ttl: Duration,

    /// Janitor wake interval.
    pub cleanup_interval: Duration,

    /// Whether `preload` runs its background enrichment step.
    pub preload_on_login: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            ttl: Duration::from_secs(30 * 60),
            cleanup_interval: Duration::from_secs(5 * 60),
            preload_on_login: true,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache capacity.
    #[must_use]
    pub fn max_entries(mut self, count: usize) -> Self {
        self.max_entries = count;
        self
    }

    /// Set the absolute session TTL.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the janitor wake interval.
    #[must_use]
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Enable or disable background enrichment in `preload`.
    #[must_use]
    pub fn preload_on_login(mut self, enabled: bool) -> Self {
        self.preload_on_login = enabled;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.max_entries == 0 {
            return Err(SessionError::Config(
                "max_entries must be positive".to_string(),
            ));
        }
        if self.ttl.is_zero() {
            return Err(SessionError::Config("ttl must be positive".to_string()));
        }
        if self.cleanup_interval.is_zero() {
            return Err(SessionError::Config(
                "cleanup_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.ttl, Duration::from_secs(1800));
        assert_eq!(config.cleanup_interval, Duration::from_secs(300));
        assert!(config.preload_on_login);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(SessionConfig::new().max_entries(0).validate().is_err());
        assert!(SessionConfig::new().ttl(Duration::ZERO).validate().is_err());
        assert!(
            SessionConfig::new()
                .cleanup_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(SessionConfig::new().validate().is_ok());
    }
}
