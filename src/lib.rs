//! Connect a heterogeneous list of databases concurrently, expose each under a
//! name, and tear them all down again.
//!
//! ```no_run
//! use db_connector::{ConnectOptions, ConnectionSpec, Coordinator};
//!
//! # async fn run() -> db_connector::Result<()> {
//! let coordinator = Coordinator::new();
//! coordinator
//!     .init(
//!         vec![
//!             ConnectionSpec::new("mongodb://localhost/app").named(vec!["app:main", "logs"]),
//!             ConnectionSpec::new("redis://localhost").named("cache"),
//!         ],
//!         ConnectOptions::new(),
//!     )
//!     .await?;
//!
//! let cache = coordinator.get("cache")?;
//! # let _ = cache;
//! coordinator.close().await;
//! # Ok(())
//! # }
//! ```

pub mod db;

pub use db::{
    BackendKind, ConnectOptions, ConnectionSpec, ConnectionState, ConnectionStatus, Connector,
    ConnectorError, Coordinator, Entry, Handle, Logger, NameSpec, OrmConnection, OrmHandle,
    Registration, Registry, Result, Role, TracingLogger,
};
