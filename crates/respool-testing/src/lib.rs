//! # respool-testing
//!
//! Test infrastructure for the pooling layer: a scriptable backend connector
//! whose behavior tests can observe and control.
//!
//! [`StubConnector`] counts every connect call, can be scripted to fail the
//! next N connects, and numbers the clients it produces so tests can tell a
//! replacement handle from the original.
//!
//! ## Example
//!
//! ```rust,ignore
//! use respool_testing::StubConnector;
//!
//! let connector = StubConnector::new().fail_next(1);
//! assert!(connector.connect().await.is_err());
//! let client = connector.connect().await?;
//! assert_eq!(client.id, 0);
//! assert_eq!(connector.connect_count(), 2);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use respool_backend::{ConnectError, Connector};

/// An opaque client handle produced by [`StubConnector`].
#[derive(Debug)]
pub struct StubClient {
    /// Monotonic handle number, starting at 0 for the first successful
    /// connect. A pool slot that was replaced holds a client with a higher
    /// id than the one it started with.
    pub id: u64,
}

/// A backend connector for tests.
pub struct StubConnector {
    seq: AtomicU64,
    connects: AtomicU64,
    fail_remaining: AtomicU64,
}

impl StubConnector {
    /// A connector whose connects all succeed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            connects: AtomicU64::new(0),
            fail_remaining: AtomicU64::new(0),
        }
    }

    /// Script the next `n` connect calls to fail with a handshake error.
    #[must_use]
    pub fn fail_next(self, n: u64) -> Self {
        self.fail_remaining.store(n, Ordering::Relaxed);
        self
    }

    /// Total connect calls observed, successful or not.
    #[must_use]
    pub fn connect_count(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }
}

impl Default for StubConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for StubConnector {
    type Client = StubClient;

    async fn connect(&self) -> Result<StubClient, ConnectError> {
        self.connects.fetch_add(1, Ordering::Relaxed);

        let scripted_failure = self
            .fail_remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if scripted_failure {
            return Err(ConnectError::Handshake("scripted failure".to_string()));
        }

        Ok(StubClient {
            id: self.seq.fetch_add(1, Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_failures_then_success() {
        let connector = StubConnector::new().fail_next(2);
        assert!(connector.connect().await.is_err());
        assert!(connector.connect().await.is_err());

        let client = connector.connect().await.unwrap();
        assert_eq!(client.id, 0);
        assert_eq!(connector.connect_count(), 3);
    }
}
