use std::collections::HashMap;

use thiserror::Error;

use crate::api::Operation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Video {id} already has a pending {pending}")]
pub struct Busy {
    pub id: String,
    pub pending: Operation,
}

/// Tracks which ids have a mutation awaiting the server.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    pending: HashMap<String, Operation>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for `operation`, failing if another operation holds it.
    pub fn try_begin(&mut self, id: &str, operation: Operation) -> Result<(), Busy> {
        if let Some(&pending) = self.pending.get(id) {
            return Err(Busy {
                id: id.to_string(),
                pending,
            });
        }
        self.pending.insert(id.to_string(), operation);
        Ok(())
    }

    /// Release `id`. Returns the operation that held it.
    pub fn finish(&mut self, id: &str) -> Option<Operation> {
        self.pending.remove(id)
    }

    pub fn pending(&self, id: &str) -> Option<Operation> {
        self.pending.get(id).copied()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
