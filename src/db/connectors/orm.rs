//! Document store through a caller-supplied ORM connection
//!
//! The ORM object is never created here: it comes in through
//! [`ConnectOptions::orm`]. Its "open" event may never arrive, so the connect
//! is bounded by [`ConnectOptions::orm_watchdog`].

use async_trait::async_trait;
use std::sync::Arc;

use super::downcast;
use crate::db::connection::{BackendKind, ConnectionSpec};
use crate::db::driver::{Connector, OrmHandle, Registration};
use crate::db::error::{ConnectorError, Result};
use crate::db::events::{settle, Settled};
use crate::db::options::ConnectOptions;
use crate::db::registry::Handle;

#[derive(Debug, Default, Clone, Copy)]
pub struct OrmConnector;

#[async_trait]
impl Connector for OrmConnector {
    fn kind(&self) -> BackendKind {
        BackendKind::MongoOrm
    }

    async fn connect(
        &self,
        spec: &ConnectionSpec,
        options: &ConnectOptions,
    ) -> Result<Vec<Registration>> {
        let orm = options.orm.clone().ok_or_else(|| {
            ConnectorError::Configuration(format!(
                "{} requests the ORM layer but no ORM connection was provided",
                spec.target()
            ))
        })?;

        let name = spec.registry_name();
        let label = format!("{}/{name}", self.kind());
        let events = orm.connect(&spec.connection_string);

        match settle(events, Some(options.orm_watchdog), label, options.logger.clone()).await {
            Settled::Ready(()) => Ok(vec![Registration::primary(name, Arc::new(OrmHandle(orm)))]),
            Settled::Failed(cause) => Err(ConnectorError::Connect {
                backend: self.kind(),
                target: name,
                cause,
            }),
            Settled::Expired(after) => Err(ConnectorError::Timeout {
                backend: self.kind(),
                target: name,
                after,
            }),
        }
    }

    async fn close(&self, handle: Handle) -> std::result::Result<(), String> {
        let orm = downcast::<OrmHandle>(handle)?;
        orm.0.disconnect().await
    }
}
