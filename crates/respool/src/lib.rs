//! # respool
//!
//! Resource pooling layer for backend-service applications: a bounded
//! connection pool and a bounded TTL/LRU session cache behind a single
//! init/shutdown lifecycle.
//!
//! Request handlers run backend operations through
//! [`Pool::with_connection`] (automatic retry, fault eviction) and consult
//! [`SessionPool::get`] to avoid re-deriving session context per request,
//! falling back to their own load path on a miss.
//!
//! The [`Pools`] struct is the composition root: construct it during
//! application startup, inject it where needed, and call
//! [`Pools::shutdown`] during teardown. Nothing in this crate is a global;
//! tests can run any number of independent instances.
//!
//! ## Example
//!
//! ```rust,ignore
//! use respool::{Pools, PoolConfig, SessionConfig, SessionData};
//!
//! let pools = Pools::initialize(
//!     connector,
//!     PoolConfig::new().max_connections(20),
//!     SessionConfig::new().max_entries(100),
//! )
//! .await?;
//!
//! let rows = pools
//!     .connections()
//!     .with_connection(|client| async move { client.query("...").await })
//!     .await?;
//!
//! pools.sessions().store(SessionData { /* ... */ });
//!
//! pools.shutdown();
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod pools;

pub use pools::{InitError, Pools};

pub use respool_backend::{BackendConfig, ConfigError, ConnectError, Connector, Credentials};
pub use respool_conn::{
    Backoff, OperationError, Pool, PoolConfig, PoolError, PoolStats, PooledConnection,
};
pub use respool_session::{
    SessionConfig, SessionData, SessionEntry, SessionError, SessionPool, SessionStats,
    SessionUpdate,
};
