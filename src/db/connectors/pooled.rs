//! Relational connector over a connection-string pool
//!
//! A pool is built per spec, one connection is borrowed and returned to prove
//! the server is reachable, and the pool itself becomes the registered handle.

use async_trait::async_trait;
use std::sync::Arc;

use super::downcast;
use crate::db::connection::{BackendKind, ConnectionSpec};
use crate::db::driver::{Connector, PoolDriver, Registration};
use crate::db::error::{ConnectorError, Result};
use crate::db::options::ConnectOptions;
use crate::db::registry::Handle;

pub struct PooledConnector<D> {
    driver: D,
}

impl<D: PoolDriver> PooledConnector<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl<D: PoolDriver> Connector for PooledConnector<D> {
    fn kind(&self) -> BackendKind {
        BackendKind::MySQL
    }

    async fn connect(
        &self,
        spec: &ConnectionSpec,
        _options: &ConnectOptions,
    ) -> Result<Vec<Registration>> {
        let name = spec.registry_name();
        let pool = self
            .driver
            .create_pool(&spec.connection_string)
            .map_err(|cause| {
                ConnectorError::InvalidConnectionString(format!("{}/{name}: {cause}", self.kind()))
            })?;

        if let Err(cause) = self.driver.check_out(&pool).await {
            if let Err(e) = self.driver.end(&pool).await {
                tracing::debug!(backend = %self.kind(), connection = %name, "discarding pool failed: {e}");
            }
            return Err(ConnectorError::Connect {
                backend: self.kind(),
                target: name,
                cause,
            });
        }

        Ok(vec![Registration::primary(name, Arc::new(pool))])
    }

    async fn close(&self, handle: Handle) -> std::result::Result<(), String> {
        let pool = downcast::<D::Pool>(handle)?;
        self.driver.end(&pool).await
    }
}
