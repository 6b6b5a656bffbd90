//! # respool-conn
//!
//! Bounded connection pool for an opaque backend service.
//!
//! The pool owns a fixed set of backend client handles and lends exclusive,
//! short-lived use of them to concurrent callers, isolating the rest of the
//! system from individual connection failures.
//!
//! ## Features
//!
//! - Fixed-size slot set with eager, fail-fast initialization
//! - Strictly FIFO wait queue with direct handoff on release
//! - Acquire timeout reported separately from operation failure
//! - Retry with exponential backoff on failed operations
//! - Fault-threshold replacement of chronically failing connections
//! - Janitor task reporting idle statistics
//! - Snapshot statistics for observability
//!
//! ## Example
//!
//! ```rust,ignore
//! use respool_conn::{Pool, PoolConfig};
//!
//! let config = PoolConfig::new()
//!     .max_connections(20)
//!     .retry_attempts(3);
//!
//! let pool = Pool::initialize(config, connector).await?;
//!
//! // Primary API: one backend operation with automatic retry.
//! let rows = pool
//!     .with_connection(|client| async move { client.query("...").await })
//!     .await?;
//!
//! let stats = pool.stats();
//! println!("utilization: {:.1}%", stats.utilization());
//!
//! pool.shutdown();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod pool;

pub use backoff::Backoff;
pub use config::PoolConfig;
pub use error::{OperationError, PoolError};
pub use pool::{Pool, PoolStats, PooledConnection};
