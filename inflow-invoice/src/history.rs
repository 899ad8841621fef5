//! Invoice history
//!
//! Invoices a user has created are kept newest first, one entry per
//! `invoiceId`. Saving a record with an id already in the history replaces
//! the old entry and moves it to the front. Records without an id are always
//! added as new entries.
//!
//! Listeners subscribe to a broadcast channel of [`HistoryEvent`]s.

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::HistoryError;
use crate::record::InvoiceRecord;
use crate::token::encode_invoice;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub record: InvoiceRecord,
    /// Token of the record at the time it was saved
    pub token: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    Added(HistoryEntry),
    Updated(HistoryEntry),
    Cleared,
    /// Contents replaced by a snapshot, newest first
    Restored(Vec<HistoryEntry>),
}

pub trait HistoryStore: Send + Sync {
    /// Validate and save a record, returning the stored entry.
    fn put(&self, record: InvoiceRecord) -> Result<HistoryEntry, HistoryError>;

    /// All entries, newest first
    fn list(&self) -> Vec<HistoryEntry>;

    fn get(&self, invoice_id: &str) -> Option<HistoryEntry>;

    fn clear(&self);

    fn subscribe(&self) -> broadcast::Receiver<HistoryEvent>;
}

pub struct MemoryHistoryStore {
    entries: RwLock<VecDeque<HistoryEntry>>,
    limit: Option<NonZeroUsize>,
    events: broadcast::Sender<HistoryEvent>,
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: RwLock::new(VecDeque::new()),
            limit: None,
            events,
        }
    }

    /// Keep at most `limit` entries, dropping the oldest.
    pub fn with_limit(mut self, limit: NonZeroUsize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Serialize all entries for persistence.
    pub fn export_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(&self.list())?)
    }

    /// Replace the contents with a previously exported snapshot.
    ///
    /// Entries that no longer pass the schema are skipped, and only the
    /// first (newest) entry for each `invoiceId` is kept.
    pub fn import_json(&self, snapshot: &str) -> Result<usize, HistoryError> {
        let restored: Vec<HistoryEntry> = serde_json::from_str(snapshot)?;

        let mut seen = HashSet::new();
        let mut kept = VecDeque::with_capacity(restored.len());
        for entry in restored {
            if let Err(e) = entry.record.validate() {
                tracing::warn!("skipping stored invoice: {}", e);
                continue;
            }
            if let Some(id) = &entry.record.invoice_id {
                if !seen.insert(id.clone()) {
                    tracing::debug!("skipping older duplicate of invoice {}", id);
                    continue;
                }
            }
            kept.push_back(entry);
        }
        if let Some(limit) = self.limit {
            kept.truncate(limit.get());
        }

        let count = kept.len();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        *entries = kept;
        self.notify(HistoryEvent::Restored(entries.iter().cloned().collect()));
        Ok(count)
    }

    fn notify(&self, event: HistoryEvent) {
        // no receivers is fine
        let _ = self.events.send(event);
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn put(&self, record: InvoiceRecord) -> Result<HistoryEntry, HistoryError> {
        record.validate()?;

        let entry = HistoryEntry {
            token: encode_invoice(&record),
            record,
            saved_at: Utc::now(),
        };

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let existing = entry.record.invoice_id.as_ref().and_then(|id| {
            entries
                .iter()
                .position(|e| e.record.invoice_id.as_ref() == Some(id))
        });
        if let Some(index) = existing {
            entries.remove(index);
        }
        entries.push_front(entry.clone());
        if let Some(limit) = self.limit {
            entries.truncate(limit.get());
        }

        tracing::debug!(
            "saved invoice {:?} ({} entries)",
            entry.record.invoice_id,
            entries.len()
        );

        // sent under the lock so subscribers see writes in order
        if existing.is_some() {
            self.notify(HistoryEvent::Updated(entry.clone()));
        } else {
            self.notify(HistoryEvent::Added(entry.clone()));
        }
        Ok(entry)
    }

    fn list(&self) -> Vec<HistoryEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    fn get(&self, invoice_id: &str) -> Option<HistoryEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .find(|e| e.record.invoice_id.as_deref() == Some(invoice_id))
            .cloned()
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        self.notify(HistoryEvent::Cleared);
    }

    fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }
}
