//! In-memory document association cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use plotdoc_core::{Document, ResolutionOutcome, Timestamp, UnitKey};
use tokio::sync::RwLock;

use super::stats::CacheStats;

/// Observable state of one cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    Absent,
    Present,
    Stale,
}

/// The complete result of one resolution, as stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAssociation {
    /// The fetched page of documents, at most one resolver limit long.
    pub documents: Arc<[Document]>,
    /// How many documents the unit has, including those past the fetched page.
    pub total: usize,
    pub outcome: ResolutionOutcome,
    pub cached_at: Timestamp,
}

impl CachedAssociation {
    pub fn new(documents: Vec<Document>, outcome: ResolutionOutcome) -> Self {
        Self {
            total: documents.len(),
            documents: documents.into(),
            outcome,
            cached_at: Utc::now(),
        }
    }

    /// Record the server-side total. Never below the number fetched.
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = total.max(self.documents.len());
        self
    }

    /// Number of documents fetched, see `total` for the full count.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Present(CachedAssociation),
    Stale,
}

/// Per-unit document cache shared by the loader, the mutation coordinator
/// and readers.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: RwLock<HashMap<UnitKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached documents for `key`, or `None` on a miss (absent or stale).
    pub async fn get(&self, key: &UnitKey) -> Option<Arc<[Document]>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(Slot::Present(entry)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.documents))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Full entry for `key` without touching hit/miss counters.
    pub async fn entry(&self, key: &UnitKey) -> Option<CachedAssociation> {
        match self.entries.read().await.get(key) {
            Some(Slot::Present(entry)) => Some(entry.clone()),
            _ => None,
        }
    }

    pub async fn state(&self, key: &UnitKey) -> EntryState {
        match self.entries.read().await.get(key) {
            None => EntryState::Absent,
            Some(Slot::Present(_)) => EntryState::Present,
            Some(Slot::Stale) => EntryState::Stale,
        }
    }

    /// Replace the entry for `key` with a complete association.
    pub async fn set(&self, key: UnitKey, association: CachedAssociation) {
        self.entries
            .write()
            .await
            .insert(key, Slot::Present(association));
    }

    /// Mark one entry stale. Does not trigger a refetch.
    ///
    /// Returns `true` if a present entry was invalidated.
    pub async fn invalidate(&self, key: &UnitKey) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(slot) if matches!(slot, Slot::Present(_)) => {
                *slot = Slot::Stale;
                self.invalidations.fetch_add(1, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }

    /// Mark every present entry stale. Returns how many were invalidated.
    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let mut count = 0;
        for slot in entries.values_mut() {
            if matches!(slot, Slot::Present(_)) {
                *slot = Slot::Stale;
                count += 1;
            }
        }
        self.invalidations
            .fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Forget every key, present or stale.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Keys with a present entry, in key order.
    pub async fn present_keys(&self) -> Vec<UnitKey> {
        let entries = self.entries.read().await;
        let mut keys: Vec<UnitKey> = entries
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Present(_)))
            .map(|(key, _)| *key)
            .collect();
        keys.sort();
        keys
    }

    /// Keys ever written and not cleared, present or stale, in key order.
    pub async fn known_keys(&self) -> Vec<UnitKey> {
        let mut keys: Vec<UnitKey> = self.entries.read().await.keys().copied().collect();
        keys.sort();
        keys
    }

    pub async fn stats(&self) -> CacheStats {
        let entry_count = self
            .entries
            .read()
            .await
            .values()
            .filter(|slot| matches!(slot, Slot::Present(_)))
            .count() as u64;
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            entry_count,
        }
    }
}
