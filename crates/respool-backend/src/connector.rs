//! Connector seam for producing backend clients.

use async_trait::async_trait;

use crate::error::ConnectError;

/// Asynchronous constructor of backend client handles.
///
/// A pool owns every client its connector produces and lends shared
/// references to callers for the duration of a single operation. Callers
/// must not retain a client beyond that call.
///
/// Implementations typically wrap whatever SDK the backend ships: the pool
/// only needs to construct handles and hand them out, it never inspects
/// them.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opaque client handle produced by this connector.
    type Client: Send + Sync + 'static;

    /// Establish a new client handle, performing any network or
    /// authentication round-trips the backend requires.
    async fn connect(&self) -> Result<Self::Client, ConnectError>;
}
