//! PostgreSQL driver bindings

use async_trait::async_trait;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::future::Future;
use std::ops::Deref;
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_postgres::config::SslMode;
use tokio_postgres::{Client, Config, NoTls};

use crate::db::driver::ClientDriver;

/// A connected client together with the task driving its socket
pub struct PostgresClient {
    client: Client,
    connection: Mutex<Option<JoinHandle<()>>>,
}

impl PostgresClient {
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Deref for PostgresClient {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}

// tokio-postgres hands back the socket as a future that must be polled
fn spawn_connection<F>(connection: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), tokio_postgres::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::warn!("PostgreSQL connection error: {e}");
        }
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDriver;

#[async_trait]
impl ClientDriver for PostgresDriver {
    type Client = PostgresClient;

    async fn connect(&self, uri: &str) -> Result<PostgresClient, String> {
        let config: Config = uri.parse().map_err(|e: tokio_postgres::Error| e.to_string())?;

        let (client, connection) = match config.get_ssl_mode() {
            SslMode::Require => {
                let tls = TlsConnector::new().map_err(|e| e.to_string())?;
                let (client, connection) = config
                    .connect(MakeTlsConnector::new(tls))
                    .await
                    .map_err(|e| e.to_string())?;
                (client, spawn_connection(connection))
            }
            _ => {
                let (client, connection) = config.connect(NoTls).await.map_err(|e| e.to_string())?;
                (client, spawn_connection(connection))
            }
        };

        Ok(PostgresClient {
            client,
            connection: Mutex::new(Some(connection)),
        })
    }

    /// Stops the connection task, which drops the socket.
    async fn close(&self, client: &PostgresClient) -> Result<(), String> {
        let task = client
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match task {
            Some(task) => {
                task.abort();
                match task.await {
                    Ok(()) => Ok(()),
                    Err(e) if e.is_cancelled() => Ok(()),
                    Err(e) => Err(e.to_string()),
                }
            }
            None => Ok(()),
        }
    }
}
