use async_trait::async_trait;
use std::sync::Arc;

use super::connection::{BackendKind, ConnectionSpec};
use super::error::Result;
use super::events::EventStream;
use super::options::ConnectOptions;
use super::registry::{Handle, Role};

/// A handle a connector wants registered under `name`
pub struct Registration {
    pub name: String,
    pub role: Role,
    pub handle: Handle,
}

impl Registration {
    pub fn primary(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            role: Role::Primary,
            handle,
        }
    }

    pub fn alias(name: impl Into<String>, parent: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            role: Role::Alias {
                parent: parent.into(),
            },
            handle,
        }
    }
}

/// Connect and close routines for one backend family
#[async_trait]
pub trait Connector: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Open the connection described by `spec`.
    ///
    /// Returns the primary registration first, followed by any aliases that
    /// share its lifecycle.
    async fn connect(&self, spec: &ConnectionSpec, options: &ConnectOptions)
        -> Result<Vec<Registration>>;

    /// Release a primary handle previously returned by `connect`.
    ///
    /// The error is a description of the failure; the coordinator logs it and
    /// carries on.
    async fn close(&self, handle: Handle) -> std::result::Result<(), String>;
}

/// Native document-store driver: one socket, many databases
#[async_trait]
pub trait DocumentDriver: Send + Sync + 'static {
    type Client: Send + Sync + 'static;
    type Database: Send + Sync + 'static;

    async fn connect(&self, uri: &str) -> std::result::Result<Self::Client, String>;

    /// Database the connection string points at
    fn database_name(&self, client: &Self::Client) -> String;

    /// Another database on the same connection
    fn database(&self, client: &Self::Client, name: &str) -> Self::Database;

    async fn close(&self, client: &Self::Client) -> std::result::Result<(), String>;
}

/// Relational driver that builds a pool from a connection string
#[async_trait]
pub trait PoolDriver: Send + Sync + 'static {
    type Pool: Send + Sync + 'static;

    fn create_pool(&self, uri: &str) -> std::result::Result<Self::Pool, String>;

    /// Borrow one connection and hand it straight back
    async fn check_out(&self, pool: &Self::Pool) -> std::result::Result<(), String>;

    async fn end(&self, pool: &Self::Pool) -> std::result::Result<(), String>;
}

/// Relational driver with a single client managing its own connection
#[async_trait]
pub trait ClientDriver: Send + Sync + 'static {
    type Client: Send + Sync + 'static;

    async fn connect(&self, uri: &str) -> std::result::Result<Self::Client, String>;

    async fn close(&self, client: &Self::Client) -> std::result::Result<(), String>;
}

/// Key-value driver announcing readiness through events
#[async_trait]
pub trait KeyValueDriver: Send + Sync + 'static {
    type Client: Send + Sync + 'static;

    /// Start connecting; the stream yields `Ready` once, and `Error` any number of times
    fn open(&self, uri: &str) -> EventStream<Self::Client>;

    async fn quit(&self, client: &Self::Client) -> std::result::Result<(), String>;
}

/// Connection object of an ORM layer, configured and owned by the caller
#[async_trait]
pub trait OrmConnection: Send + Sync + 'static {
    /// Start connecting; `Ready` plays the role of the "open" event
    fn connect(&self, uri: &str) -> EventStream<()>;

    async fn disconnect(&self) -> std::result::Result<(), String>;
}

/// Registered handle of the ORM-layer family
#[derive(Clone)]
pub struct OrmHandle(pub Arc<dyn OrmConnection>);
