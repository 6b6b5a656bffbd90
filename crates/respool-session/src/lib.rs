//! # respool-session
//!
//! Keyed, capacity-bounded, TTL-expiring session cache.
//!
//! Caches per-user session context (role, profile) so request handlers do
//! not re-derive it on every request. Entries expire on an absolute TTL
//! clock, are evicted least-recently-used when the cache is full, and can be
//! invalidated explicitly ahead of expiry.
//!
//! A miss is a normal outcome communicated as `None`, never an error: the
//! caller re-derives the session through its own path and stores it again.
//!
//! ## Features
//!
//! - O(1) get/store/update/invalidate/remove
//! - Absolute TTL expiry independent of access recency
//! - LRU eviction at capacity
//! - Explicit invalidation distinct from expiry
//! - Best-effort async profile enrichment after login
//! - Janitor task sweeping expired and invalidated entries
//!
//! ## Example
//!
//! ```rust,ignore
//! use respool_session::{SessionConfig, SessionData, SessionPool};
//!
//! let pool: SessionPool<serde_json::Value> = SessionPool::new(SessionConfig::new())?;
//!
//! pool.store(SessionData {
//!     user_id: "u1".to_string(),
//!     email: "u1@example.com".to_string(),
//!     role: "ADMIN".to_string(),
//!     profile: serde_json::json!({}),
//! });
//!
//! let session = pool.get("u1");
//! assert_eq!(session.map(|s| s.role), Some("ADMIN".to_string()));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod entry;
pub mod error;
pub mod pool;

pub use config::SessionConfig;
pub use entry::{SessionData, SessionEntry, SessionUpdate};
pub use error::{EnrichError, SessionError};
pub use pool::{SessionPool, SessionStats};
