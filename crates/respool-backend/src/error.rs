//! Backend contract error types.

use thiserror::Error;

/// Errors raised while assembling backend configuration.
///
/// These are construction-time failures: a pool must refuse to start with
/// incomplete configuration rather than limp along half-initialized.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backend URL is missing or empty.
    #[error("backend url is required")]
    MissingUrl,

    /// Credentials are missing or empty.
    #[error("backend credentials are required")]
    MissingCredentials,

    /// A required environment variable was not set.
    #[error("environment variable {var} is not set")]
    MissingEnv {
        /// Name of the missing variable.
        var: &'static str,
    },
}

/// Errors raised while constructing a backend client.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The backend endpoint could not be reached.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The backend rejected the supplied credentials.
    #[error("backend rejected credentials")]
    Unauthorized,

    /// Handshake or protocol-level failure.
    #[error("backend handshake failed: {0}")]
    Handshake(String),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
