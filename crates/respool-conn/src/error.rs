//! Connection pool error types.

use respool_backend::ConnectError;
use thiserror::Error;

/// Boxed error produced by a pooled operation.
pub type OperationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the connection pool.
///
/// Pool exhaustion ([`AcquireTimeout`](PoolError::AcquireTimeout)) is kept
/// distinct from operation failure
/// ([`OperationFailed`](PoolError::OperationFailed)) so callers can tell
/// "too much concurrency for the configured pool size" from "the backend is
/// slow or erroring".
#[derive(Debug, Error)]
pub enum PoolError {
    /// No connection became free within the acquire timeout.
    #[error("timed out after {waited_ms} ms waiting for a connection")]
    AcquireTimeout {
        /// Milliseconds spent waiting in the queue.
        waited_ms: u64,
    },

    /// The wrapped operation failed on every retry attempt.
    #[error("operation failed after {attempts} attempts: {source}")]
    OperationFailed {
        /// Attempts made before giving up.
        attempts: u32,
        /// The last underlying error.
        #[source]
        source: OperationError,
    },

    /// The pool was shut down while the request was pending.
    #[error("pool is shut down")]
    Shutdown,

    /// Invalid pool configuration, rejected at construction time.
    #[error("invalid pool configuration: {0}")]
    Config(String),

    /// Constructing a backend client failed.
    #[error("backend connect failed: {0}")]
    Connect(#[from] ConnectError),
}
