//! Connect/close policy per backend family
//!
//! Each connector is generic over a driver trait from [`crate::db::driver`],
//! so the policy is the same whether the driver talks to a server or is an
//! in-memory stand-in.

pub mod client;
pub mod document;
pub mod key_value;
pub mod orm;
pub mod pooled;

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::db::registry::Handle;

pub use client::ClientConnector;
pub use document::{DocumentConnector, DocumentNames};
pub use key_value::KeyValueConnector;
pub use orm::OrmConnector;
pub use pooled::PooledConnector;

fn downcast<T: Any + Send + Sync>(handle: Handle) -> Result<Arc<T>, String> {
    handle
        .downcast::<T>()
        .map_err(|_| format!("handle is not a {}", type_name::<T>()))
}
