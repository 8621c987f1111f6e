//! Relational connector over a single client whose library manages the pool

use async_trait::async_trait;
use std::sync::Arc;

use super::downcast;
use crate::db::connection::{BackendKind, ConnectionSpec};
use crate::db::driver::{ClientDriver, Connector, Registration};
use crate::db::error::{ConnectorError, Result};
use crate::db::options::ConnectOptions;
use crate::db::registry::Handle;

pub struct ClientConnector<D> {
    driver: D,
}

impl<D: ClientDriver> ClientConnector<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: ClientDriver> Connector for ClientConnector<D> {
    fn kind(&self) -> BackendKind {
        BackendKind::PostgreSQL
    }

    async fn connect(
        &self,
        spec: &ConnectionSpec,
        _options: &ConnectOptions,
    ) -> Result<Vec<Registration>> {
        let name = spec.registry_name();
        let client = self
            .driver
            .connect(&spec.connection_string)
            .await
            .map_err(|cause| ConnectorError::Connect {
                backend: self.kind(),
                target: name.clone(),
                cause,
            })?;

        Ok(vec![Registration::primary(name, Arc::new(client))])
    }

    async fn close(&self, handle: Handle) -> std::result::Result<(), String> {
        let client = downcast::<D::Client>(handle)?;
        self.driver.close(&client).await
    }
}
