//! In-flight guard for AI requests.
//!
//! DESIGN
//! ======
//! At most one outstanding AI call per client and action, mirroring a UI
//! that disables its trigger while a call runs. A second request is refused
//! rather than queued. `try_begin` hands back a permit; dropping it (on
//! success, error, or a client that hung up mid-request) frees the slot.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Listing,
    Negotiation,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Listing => "listing",
            Self::Negotiation => "negotiation",
        })
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InflightError {
    #[error("a {action} request is already in progress")]
    Busy { action: Action },
}

impl crate::error::ErrorCode for InflightError {
    fn error_code(&self) -> &'static str {
        "E_REQUEST_IN_FLIGHT"
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// TRACKER
// =============================================================================

type Slot = (String, Action);

#[derive(Clone, Default)]
pub struct InflightTracker {
    active: Arc<Mutex<HashSet<Slot>>>,
}

impl InflightTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `client_id` and `action`.
    ///
    /// # Errors
    ///
    /// Returns [`InflightError::Busy`] while another permit for the same slot
    /// is alive.
    pub fn try_begin(&self, client_id: &str, action: Action) -> Result<InflightPermit, InflightError> {
        let slot = (client_id.to_string(), action);
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(slot.clone()) {
            return Err(InflightError::Busy { action });
        }
        debug!(client_id, %action, "inflight: begin");
        Ok(InflightPermit { active: Arc::clone(&self.active), slot })
    }

    /// Whether `client_id` currently holds the slot for `action`.
    #[cfg(test)]
    #[must_use]
    pub fn is_active(&self, client_id: &str, action: Action) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(client_id.to_string(), action))
    }
}

/// Releases its slot on drop.
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct InflightPermit {
    active: Arc<Mutex<HashSet<Slot>>>,
    slot: Slot,
}

impl Drop for InflightPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.slot);
        debug!(client_id = %self.slot.0, action = %self.slot.1, "inflight: end");
    }
}

#[cfg(test)]
#[path = "inflight_test.rs"]
mod tests;
