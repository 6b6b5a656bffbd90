//! # respool-backend
//!
//! The contract between the pooling layer and the backend service it fronts.
//!
//! The pools never speak to the backend directly. They hold opaque client
//! handles produced by a [`Connector`] and lend them out one operation at a
//! time. This crate defines that seam:
//!
//! - [`Connector`]: asynchronous constructor of client handles
//! - [`BackendConfig`] / [`Credentials`]: connection parameters with
//!   fail-fast validation and environment loading
//! - [`ConfigError`] / [`ConnectError`]: construction-time and
//!   connection-time failures
//!
//! ## Example
//!
//! ```rust,ignore
//! use respool_backend::{BackendConfig, Credentials};
//!
//! let config = BackendConfig::from_env()?;
//! // or explicitly:
//! let config = BackendConfig::new(
//!     "https://backend.internal",
//!     Credentials::api_key("service-key"),
//! );
//! config.validate()?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod connector;
pub mod error;

pub use config::{BackendConfig, Credentials};
pub use connector::Connector;
pub use error::{ConfigError, ConnectError};
