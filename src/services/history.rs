//! History service: the persisted list of past listings.
//!
//! DESIGN
//! ======
//! The whole list is one JSON array under a single store key, read once at
//! startup and rewritten in full on every mutation. Items are kept newest
//! first. The field names match the browser-storage format
//! (`thumbnailBase64`, `modalPrice`) so an exported list loads unchanged.
//!
//! ERROR HANDLING
//! ==============
//! Missing or corrupt stored data loads as an empty history and is only
//! logged. A failed write leaves the in-memory list untouched, so memory
//! never runs ahead of disk.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::listing::{ListingResult, ListingStyle};
use crate::error::ErrorCode as _;
use crate::store::{KvStore, StoreError};

pub const HISTORY_KEY: &str = "sellitfast_history";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Creation time in milliseconds, as a string.
    pub id: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Thumbnail as a data URI.
    pub thumbnail_base64: String,
    pub result: ListingResult,
    pub style: ListingStyle,
    /// Seller's cost basis in Rupiah.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modal_price: Option<i64>,
}

impl HistoryItem {
    #[must_use]
    pub fn new(
        result: ListingResult,
        style: ListingStyle,
        thumbnail_base64: String,
        modal_price: Option<i64>,
    ) -> Self {
        let timestamp = now_ms();
        Self { id: timestamp.to_string(), timestamp, thumbnail_base64, result, style, modal_price }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history item not found: {0}")]
    NotFound(String),
    #[error("history store failed: {0}")]
    Store(#[from] StoreError),
    #[error("history encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl crate::error::ErrorCode for HistoryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_HISTORY_NOT_FOUND",
            Self::Store(_) | Self::Encode(_) => "E_STORAGE_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// STORE
// =============================================================================

pub struct HistoryStore {
    store: Arc<dyn KvStore>,
    items: RwLock<Vec<HistoryItem>>,
}

impl HistoryStore {
    /// A history with nothing loaded yet.
    #[cfg(test)]
    #[must_use]
    pub fn empty(store: Arc<dyn KvStore>) -> Self {
        Self { store, items: RwLock::new(Vec::new()) }
    }

    /// Read the persisted list. Never fails: unreadable or corrupt data
    /// yields an empty history.
    pub async fn load(store: Arc<dyn KvStore>) -> Self {
        let items = match store.get(HISTORY_KEY).await {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "history: read failed; starting empty");
                Vec::new()
            }
        };
        debug!(count = items.len(), "history: loaded");
        Self { store, items: RwLock::new(items) }
    }

    /// Current items, newest first.
    pub async fn list(&self) -> Vec<HistoryItem> {
        self.items.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Prepend `item` and persist. An id already in use gets a numeric
    /// suffix. Returns the stored item.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written; memory is unchanged.
    pub async fn append(&self, mut item: HistoryItem) -> Result<HistoryItem, HistoryError> {
        let mut items = self.items.write().await;
        item.id = unique_id(&items, &item.id);

        let mut next = Vec::with_capacity(items.len() + 1);
        next.push(item.clone());
        next.extend(items.iter().cloned());
        self.persist(&next).await?;

        *items = next;
        info!(id = %item.id, style = %item.style, count = items.len(), "history: appended");
        Ok(item)
    }

    /// Remove the item with `id` and persist.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NotFound`] for an unknown id, or a store error.
    pub async fn delete(&self, id: &str) -> Result<(), HistoryError> {
        let mut items = self.items.write().await;
        if !items.iter().any(|item| item.id == id) {
            return Err(HistoryError::NotFound(id.to_string()));
        }
        let next: Vec<HistoryItem> = items.iter().filter(|item| item.id != id).cloned().collect();
        self.persist(&next).await?;

        *items = next;
        info!(%id, count = items.len(), "history: deleted");
        Ok(())
    }

    /// Empty the list and remove the persisted key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), HistoryError> {
        let mut items = self.items.write().await;
        self.store.remove(HISTORY_KEY).await?;
        let cleared = items.len();
        items.clear();
        info!(cleared, "history: cleared");
        Ok(())
    }

    async fn persist(&self, items: &[HistoryItem]) -> Result<(), HistoryError> {
        let raw = encode(items)?;
        self.store.set(HISTORY_KEY, &raw).await.inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), "history: write failed");
        })?;
        Ok(())
    }
}

fn unique_id(items: &[HistoryItem], base: &str) -> String {
    let taken = |candidate: &str| items.iter().any(|item| item.id == candidate);
    if !taken(base) {
        return base.to_string();
    }
    (1_u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Parse a stored list. Anything unreadable is treated as no history.
#[must_use]
pub fn decode(raw: &str) -> Vec<HistoryItem> {
    match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, bytes = raw.len(), "history: stored data is corrupt; ignoring");
            Vec::new()
        }
    }
}

/// Serialize a list for storage.
///
/// # Errors
///
/// Returns the `serde_json` error if serialization fails.
pub fn encode(items: &[HistoryItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
