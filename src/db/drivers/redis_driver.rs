//! Redis driver bindings
//!
//! The redis crate resolves a future where other clients emit `ready`; the
//! binding turns that into the event stream the key-value connector expects.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client;

use crate::db::driver::KeyValueDriver;
use crate::db::events::{event_channel, DriverEvent, EventStream};

pub struct RedisClient {
    client: Client,
    connection: MultiplexedConnection,
}

impl RedisClient {
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// A handle onto the shared multiplexed connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

async fn ready(uri: &str) -> Result<RedisClient, String> {
    let client = Client::open(uri).map_err(|e| e.to_string())?;

    let mut connection = client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| e.to_string())?;

    let _: String = redis::cmd("PING")
        .query_async(&mut connection)
        .await
        .map_err(|e| e.to_string())?;

    Ok(RedisClient { client, connection })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RedisDriver;

#[async_trait]
impl KeyValueDriver for RedisDriver {
    type Client = RedisClient;

    fn open(&self, uri: &str) -> EventStream<RedisClient> {
        let (events, stream) = event_channel();
        let uri = uri.to_string();

        tokio::spawn(async move {
            let event = match ready(&uri).await {
                Ok(client) => DriverEvent::Ready(client),
                Err(cause) => DriverEvent::Error(cause),
            };
            let _ = events.send(event);
        });

        stream
    }

    async fn quit(&self, client: &RedisClient) -> Result<(), String> {
        let mut connection = client.connection();
        let _: () = redis::cmd("QUIT")
            .query_async(&mut connection)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
