//! Per-unit cache of resolved document associations.
//!
//! Entries are keyed by [`UnitKey`](plotdoc_core::UnitKey) and hold the
//! complete document set of one resolution together with how it was
//! obtained. A miss is distinct from a resolved-empty hit: only a miss asks
//! for resolution, an empty hit means "confirmed no documents" until the
//! entry is invalidated.
//!
//! # Entry states
//!
//! - [`EntryState::Absent`]: never resolved.
//! - [`EntryState::Present`]: resolved, possibly to an empty set.
//! - [`EntryState::Stale`]: invalidated, reads as a miss until rewritten.
//!
//! Writes replace a whole entry under one lock acquisition, so a reader sees
//! either the previous complete value or the new one.

pub mod document_cache;
pub mod stats;

pub use document_cache::{CachedAssociation, DocumentCache, EntryState};
pub use stats::CacheStats;
