//! Operator Authority Slot
//!
//! Single mutable authority cell gating market creation and resolution.
//! Readable by anyone, writable only by the current holder.

use parking_lot::RwLock;
use tracing::info;

use crate::error::{VenueError, VenueResult};

/// Holds the current operator identity
pub struct OperatorSlot {
    current: RwLock<String>,
}

impl OperatorSlot {
    pub fn new(operator: &str) -> Self {
        Self {
            current: RwLock::new(operator.to_string()),
        }
    }

    /// Get the current operator identity
    pub fn current(&self) -> String {
        self.current.read().clone()
    }

    /// Fail with `Unauthorized` unless the caller is the operator
    pub fn require_operator(&self, caller: &str) -> VenueResult<()> {
        if *self.current.read() != caller {
            return Err(VenueError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Reassign the slot; only the current holder may do this
    pub fn transfer(&self, caller: &str, new_operator: &str) -> VenueResult<()> {
        let mut current = self.current.write();
        if *current != caller {
            return Err(VenueError::Unauthorized(caller.to_string()));
        }
        *current = new_operator.to_string();
        info!(from = %caller, to = %new_operator, "Operator transferred");
        Ok(())
    }
}
