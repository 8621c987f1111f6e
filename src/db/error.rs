use std::time::Duration;
use thiserror::Error;

use super::connection::BackendKind;

/// Errors that can occur while connecting, naming or looking up connections
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error("Driver not available: {0} (not compiled)")]
    DriverNotAvailable(&'static str),
    #[error("{backend}/{target} connection error: {cause}")]
    Connect {
        backend: BackendKind,
        target: String,
        cause: String,
    },
    #[error("{backend}/{target} connection timeout after {after:?}")]
    Timeout {
        backend: BackendKind,
        target: String,
        after: Duration,
    },
    #[error("Cannot register multiple connections under name {0}")]
    NameCollision(String),
    #[error("No connection registered under name {0}")]
    NotFound(String),
    #[error("Connection {name} is not a {expected}")]
    HandleMismatch {
        name: String,
        expected: &'static str,
    },
}

impl ConnectorError {
    /// Errors caused by the supplied specs or options rather than by a backend
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ConnectorError::Configuration(_)
                | ConnectorError::InvalidConnectionString(_)
                | ConnectorError::DriverNotAvailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
