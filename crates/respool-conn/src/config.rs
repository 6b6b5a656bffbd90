//! Connection pool configuration.

use std::time::Duration;

use crate::error::PoolError;

/// Configuration for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of backend clients the pool owns.
    pub max_connections: usize,

    /// How long `acquire` waits in the queue before failing.
    pub connection_timeout: Duration,

    /// Idle age past which the janitor reports a connection as stale.
    pub idle_timeout: Duration,

    /// Janitor wake interval.
    pub idle_check_interval: Duration,

    /// Total attempts `with_connection` makes before surfacing the error.
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between attempts.
    pub retry_base_delay: Duration,

    /// Consecutive failures after which a connection is replaced.
    pub fault_threshold: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            connection_timeout: Duration::from_millis(2000),
            idle_timeout: Duration::from_secs(300),
            idle_check_interval: Duration::from_secs(60),
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            fault_threshold: 5,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of connections the pool owns.
    #[must_use]
    pub fn max_connections(mut self, count: usize) -> Self {
        self.max_connections = count;
        self
    }

    /// Set the acquire timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the idle age the janitor reports on.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the janitor wake interval.
    #[must_use]
    pub fn idle_check_interval(mut self, interval: Duration) -> Self {
        self.idle_check_interval = interval;
        self
    }

    /// Set the total operation attempts.
    #[must_use]
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the base backoff delay.
    #[must_use]
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the fault threshold for connection replacement.
    #[must_use]
    pub fn fault_threshold(mut self, threshold: u32) -> Self {
        self.fault_threshold = threshold;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_connections == 0 {
            return Err(PoolError::Config(
                "max_connections must be positive".to_string(),
            ));
        }
        if self.connection_timeout.is_zero() {
            return Err(PoolError::Config(
                "connection_timeout must be positive".to_string(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(PoolError::Config(
                "retry_attempts must be positive".to_string(),
            ));
        }
        if self.fault_threshold == 0 {
            return Err(PoolError::Config(
                "fault_threshold must be positive".to_string(),
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
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.connection_timeout, Duration::from_millis(2000));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.fault_threshold, 5);
    }

    #[test]
    fn test_builder_fluent() {
        let config = PoolConfig::new()
            .max_connections(4)
            .retry_attempts(2)
            .fault_threshold(1);

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.fault_threshold, 1);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(PoolConfig::new().max_connections(0).validate().is_err());
        assert!(PoolConfig::new().retry_attempts(0).validate().is_err());
        assert!(PoolConfig::new().fault_threshold(0).validate().is_err());
        assert!(
            PoolConfig::new()
                .connection_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(PoolConfig::new().validate().is_ok());
    }
}
