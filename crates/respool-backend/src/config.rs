//! Backend connection configuration.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the backend base URL.
pub const ENV_BACKEND_URL: &str = "RESPOOL_BACKEND_URL";

/// Environment variable holding the backend API key.
pub const ENV_BACKEND_API_KEY: &str = "RESPOOL_BACKEND_API_KEY";

/// Credentials used to authenticate against the backend service.
#[derive(Clone)]
pub enum Credentials {
    /// Service-level API key.
    ApiKey(
        /// The key material.
        String,
    ),
    /// Username and password pair.
    UserPassword {
        /// Account name.
        username: String,
        /// Account secret.
        password: String,
    },
}

impl Credentials {
    /// API-key credentials.
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// Username/password credentials.
    #[must_use]
    pub fn user_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UserPassword {
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::ApiKey(key) => key.is_empty(),
            Self::UserPassword { username, password } => username.is_empty() || password.is_empty(),
        }
    }
}

// Secret material must not leak through Debug output or logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("Credentials::ApiKey(***)"),
            Self::UserPassword { username, .. } => f
                .debug_struct("Credentials::UserPassword")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Configuration for constructing backend clients.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend base URL.
    pub url: String,

    /// Authentication credentials.
    pub credentials: Credentials,

    /// Timeout for establishing a single client.
    pub connect_timeout: Duration,
}

impl BackendConfig {
    /// Create a configuration with the default connect timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Reads [`ENV_BACKEND_URL`] and [`ENV_BACKEND_API_KEY`]. A missing
    /// variable is a construction-time error, never a silent no-op pool.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through a caller-supplied variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = lookup(ENV_BACKEND_URL).ok_or(ConfigError::MissingEnv {
            var: ENV_BACKEND_URL,
        })?;
        let key = lookup(ENV_BACKEND_API_KEY).ok_or(ConfigError::MissingEnv {
            var: ENV_BACKEND_API_KEY,
        })?;

        let config = Self::new(url, Credentials::api_key(key));
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is complete enough to construct clients.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if self.credentials.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }
}
