//! Key-value connector driven by `ready`/`error` events
//!
//! The first event settles the connect. Errors emitted after readiness are
//! logged and never touch the already-registered handle.

use async_trait::async_trait;
use std::sync::Arc;

use super::downcast;
use crate::db::connection::{BackendKind, ConnectionSpec};
use crate::db::driver::{Connector, KeyValueDriver, Registration};
use crate::db::error::{ConnectorError, Result};
use crate::db::events::{settle, Settled};
use crate::db::options::ConnectOptions;
use crate::db::registry::Handle;

pub struct KeyValueConnector<D> {
    driver: D,
}

impl<D: KeyValueDriver> KeyValueConnector<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: KeyValueDriver> Connector for KeyValueConnector<D> {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    async fn connect(
        &self,
        spec: &ConnectionSpec,
        options: &ConnectOptions,
    ) -> Result<Vec<Registration>> {
        let name = spec.registry_name();
        let label = format!("{}/{name}", self.kind());
        let events = self.driver.open(&spec.connection_string);

        match settle(events, None, label, options.logger.clone()).await {
            Settled::Ready(client) => Ok(vec![Registration::primary(name, Arc::new(client))]),
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
        let client = downcast::<D::Client>(handle)?;
        self.driver.quit(&client).await
    }
}
