//! Single-settlement adapter for event-driven drivers
//!
//! Some drivers announce readiness by emitting events instead of resolving a
//! call. [`settle`] turns such an event stream into exactly one outcome: the
//! first `Ready` or `Error` decides it, and anything emitted afterwards is only
//! logged.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::logger::Logger;

#[derive(Debug)]
pub enum DriverEvent<T> {
    Ready(T),
    Error(String),
}

pub type EventSender<T> = UnboundedSender<DriverEvent<T>>;
pub type EventStream<T> = UnboundedReceiver<DriverEvent<T>>;

pub fn event_channel<T>() -> (EventSender<T>, EventStream<T>) {
    mpsc::unbounded_channel()
}

#[derive(Debug)]
pub(crate) enum Settled<T> {
    Ready(T),
    Failed(String),
    Expired(Duration),
}

/// Wait for the first decisive event, bounded by `watchdog` when given.
///
/// Every `Error` event is logged under `label`, including the one that fails
/// the connect. Events after settlement are drained in the background.
pub(crate) async fn settle<T: Send + 'static>(
    mut events: EventStream<T>,
    watchdog: Option<Duration>,
    label: String,
    logger: Arc<dyn Logger>,
) -> Settled<T> {
    let first = match watchdog {
        Some(limit) => match tokio::time::timeout(limit, events.recv()).await {
            Ok(event) => event,
            Err(_) => {
                drain(events, label, logger);
                return Settled::Expired(limit);
            }
        },
        None => events.recv().await,
    };

    let settled = match first {
        Some(DriverEvent::Ready(value)) => Settled::Ready(value),
        Some(DriverEvent::Error(cause)) => {
            logger.error(&format!("{label}: an error occurred: {cause}"));
            Settled::Failed(cause)
        }
        None => return Settled::Failed("driver stopped before signalling readiness".into()),
    };
    drain(events, label, logger);
    settled
}

fn drain<T: Send + 'static>(mut events: EventStream<T>, label: String, logger: Arc<dyn Logger>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                DriverEvent::Error(cause) => {
                    logger.error(&format!("{label}: an error occurred: {cause}"))
                }
                DriverEvent::Ready(_) => {
                    tracing::debug!(connection = %label, "ignoring readiness after the connect settled")
                }
            }
        }
    });
}
