pub mod connection;
pub mod connectors;
pub mod coordinator;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod logger;
pub mod options;
pub mod registry;

pub use connection::{BackendKind, ConnectionSpec, NameSpec};
pub use coordinator::Coordinator;
pub use driver::{Connector, OrmConnection, OrmHandle, Registration};
pub use error::{ConnectorError, Result};
pub use lifecycle::{ConnectionState, ConnectionStatus};
pub use logger::{Logger, TracingLogger};
pub use options::ConnectOptions;
pub use registry::{Entry, Handle, Registry, Role};
