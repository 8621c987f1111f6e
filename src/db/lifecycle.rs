use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::connection::BackendKind;

/// Lifecycle of one requested connection.
///
/// `Pending → Connected → Closed`, or `Pending → Failed`. Both end states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Pending,
    Connected,
    Closed,
    Failed,
}

impl ConnectionState {
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Pending, Connected) | (Pending, Failed) | (Connected, Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub target: String,
    pub backend: BackendKind,
    pub state: ConnectionState,
}

#[derive(Default)]
struct Table {
    slots: Vec<ConnectionStatus>,
    /// Registered primary name → slot
    owners: HashMap<String, usize>,
}

/// Status of every spec handed to the coordinator
#[derive(Default)]
pub(crate) struct StateTable {
    inner: Mutex<Table>,
}

impl StateTable {
    pub fn track(&self, target: String, backend: BackendKind) -> usize {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        table.slots.push(ConnectionStatus {
            target,
            backend,
            state: ConnectionState::Pending,
        });
        table.slots.len() - 1
    }

    pub fn connected(&self, slot: usize, primary: &str) {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if Self::transition(&mut table, slot, ConnectionState::Connected) {
            table.owners.insert(primary.to_string(), slot);
        }
    }

    pub fn failed(&self, slot: usize) {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Self::transition(&mut table, slot, ConnectionState::Failed);
    }

    pub fn closed(&self, primary: &str) {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = table.owners.remove(primary) {
            Self::transition(&mut table, slot, ConnectionState::Closed);
        }
    }

    pub fn snapshot(&self) -> Vec<ConnectionStatus> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .clone()
    }

    fn transition(table: &mut Table, slot: usize, next: ConnectionState) -> bool {
        let Some(status) = table.slots.get_mut(slot) else {
            return false;
        };
        if !status.state.can_transition_to(next) {
            tracing::warn!(
                backend = %status.backend,
                connection = %status.target,
                "ignoring {:?} -> {:?}",
                status.state,
                next
            );
            return false;
        }
        status.state = next;
        true
    }
}
