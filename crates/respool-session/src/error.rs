//! Session pool error types.

use thiserror::Error;

/// Boxed error produced by a profile enrichment future.
pub type EnrichError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the session pool.
///
/// Lookups never fail: a miss is `None`. The only hard failure is invalid
/// configuration, raised once at construction time.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid session pool configuration, rejected at construction time.
    #[error("invalid session pool configuration: {0}")]
    Config(String),
}
