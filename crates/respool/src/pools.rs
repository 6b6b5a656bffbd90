//! Composition root for the pooling layer.

use thiserror::Error;

use respool_backend::Connector;
use respool_conn::{Pool, PoolConfig, PoolError};
use respool_session::{SessionConfig, SessionError, SessionPool};

/// Errors raised while bringing the pooling layer up.
#[derive(Debug, Error)]
pub enum InitError {
    /// The connection pool failed to initialize.
    #[error("connection pool init failed: {0}")]
    Connection(#[from] PoolError),

    /// The session pool failed to initialize.
    #[error("session pool init failed: {0}")]
    Session(#[from] SessionError),
}

/// The application's pooling layer: one connection pool, one session cache.
///
/// Owns the lifecycle of both pools. Construct during startup with
/// [`initialize`](Pools::initialize), inject wherever handlers need it, and
/// call [`shutdown`](Pools::shutdown) during teardown.
pub struct Pools<C: Connector, P> {
    connections: Pool<C>,
    sessions: SessionPool<P>,
}

impl<C: Connector, P: Clone + Send + 'static> Pools<C, P> {
    /// Bring both pools up, failing fast on configuration or connect errors.
    pub async fn initialize(
        connector: C,
        conn_config: PoolConfig,
        session_config: SessionConfig,
    ) -> Result<Self, InitError> {
        let sessions = SessionPool::new(session_config)?;

        let connections = match Pool::initialize(conn_config, connector).await {
            Ok(pool) => pool,
            Err(err) => {
                sessions.shutdown();
                return Err(err.into());
            }
        };

        tracing::info!("pooling layer initialized");
        Ok(Self {
            connections,
            sessions,
        })
    }

    /// The backend connection pool.
    #[must_use]
    pub fn connections(&self) -> &Pool<C> {
        &self.connections
    }

    /// The session cache.
    #[must_use]
    pub fn sessions(&self) -> &SessionPool<P> {
        &self.sessions
    }

    /// Tear both pools down. Safe to call more than once.
    pub fn shutdown(&self) {
        self.connections.shutdown();
        self.sessions.shutdown();
    }
}
