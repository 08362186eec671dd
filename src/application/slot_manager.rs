//! Slot manager use case
//!
//! Owns the recording ring and mirrors every completed recording into the
//! record store. The ring is the source of truth for the running session;
//! storage is best-effort.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::domain::slots::{Locator, SlotIndex, SlotRing, SLOT_COUNT};

use super::ports::RecordStore;

pub struct SlotManager<S: RecordStore> {
    ring: Mutex<SlotRing>,
    store: S,
}

impl<S: RecordStore> SlotManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            ring: Mutex::new(SlotRing::new()),
            store,
        }
    }

    fn ring(&self) -> MutexGuard<'_, SlotRing> {
        self.ring.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Prepare the store; a failure only disables persistence.
    pub async fn ensure_schema(&self) {
        match self.store.ensure_schema().await {
            Ok(()) => debug!("recording table ready"),
            Err(e) => warn!(error = %e, "failed to create recording table"),
        }
    }

    /// Write `locator` into the next slot and persist it.
    ///
    /// The in-memory write is never rolled back.
    pub async fn record_completed(&self, locator: Locator) -> SlotIndex {
        let index = self.ring().record_completed(locator.clone());
        info!(slot = index.number(), locator = %locator, "recording stored");

        if let Err(e) = self.store.insert_locator(&locator).await {
            warn!(error = %e, locator = %locator, "failed to persist recording");
        }
        index
    }

    /// Always `SLOT_COUNT` entries, in slot order
    pub fn slot_contents(&self) -> Vec<Option<Locator>> {
        self.ring().contents()
    }

    pub fn slot(&self, index: SlotIndex) -> Option<Locator> {
        self.ring().get(index).cloned()
    }

    pub fn next_index(&self) -> SlotIndex {
        self.ring().next_index()
    }

    /// Seed the ring from the newest persisted recordings.
    /// Returns how many slots were filled.
    pub async fn restore(&self) -> usize {
        match self.store.recent_recordings(SLOT_COUNT).await {
            Ok(rows) => {
                let count = rows.len();
                self.ring().restore(rows.into_iter().map(|row| row.locator));
                info!(count, "restored recordings from store");
                count
            }
            Err(e) => {
                warn!(error = %e, "failed to restore recordings");
                0
            }
        }
    }
}
