//! MongoDB driver bindings

use async_trait::async_trait;
use mongodb::{bson::doc, Client, Database};
use std::sync::{Arc, Mutex, PoisonError};

use crate::db::driver::{DocumentDriver, OrmConnection};
use crate::db::events::{event_channel, DriverEvent, EventStream};

/// Database the server uses when the connection string names none
const DEFAULT_DATABASE: &str = "test";

async fn connect_client(uri: &str) -> Result<Client, String> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(|e| e.to_string())?;

    // Client creation is lazy; ping so an unreachable server fails the connect
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| e.to_string())?;

    Ok(client)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MongoDriver;

#[async_trait]
impl DocumentDriver for MongoDriver {
    type Client = Client;
    type Database = Database;

    async fn connect(&self, uri: &str) -> Result<Client, String> {
        connect_client(uri).await
    }

    fn database_name(&self, client: &Client) -> String {
        client
            .default_database()
            .map(|db| db.name().to_string())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
    }

    fn database(&self, client: &Client, name: &str) -> Database {
        client.database(name)
    }

    async fn close(&self, client: &Client) -> Result<(), String> {
        // live cursors and sessions would otherwise hold the shutdown open
        client.clone().shutdown().immediate(true).await;
        Ok(())
    }
}

/// Shared MongoDB connection for an ORM layer.
///
/// Create one per process, hand it to [`crate::ConnectOptions::with_orm`], and
/// keep a clone for the models that query through it.
#[derive(Debug, Default, Clone)]
pub struct SharedMongo {
    client: Arc<Mutex<Option<Client>>>,
}

impl SharedMongo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The connected client, once the connection is open
    pub fn client(&self) -> Option<Client> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn database(&self) -> Option<Database> {
        self.client().map(|client| {
            client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE))
        })
    }
}

#[async_trait]
impl OrmConnection for SharedMongo {
    fn connect(&self, uri: &str) -> EventStream<()> {
        let (events, stream) = event_channel();
        let slot = self.client.clone();
        let uri = uri.to_string();

        tokio::spawn(async move {
            let event = match connect_client(&uri).await {
                Ok(client) => {
                    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(client);
                    DriverEvent::Ready(())
                }
                Err(cause) => DriverEvent::Error(cause),
            };
            // nobody listening means the connect was abandoned
            let _ = events.send(event);
        });

        stream
    }

    async fn disconnect(&self) -> Result<(), String> {
        let client = self.client.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(client) = client {
            client.shutdown().immediate(true).await;
        }
        Ok(())
    }
}
