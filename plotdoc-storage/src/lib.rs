//! Plotdoc Storage - Collaborator Traits, Cache and Mock Implementations
//!
//! Defines the seams to the external document, unit and category services,
//! the per-unit document association cache, and in-memory mock collaborators
//! used by tests. The HTTP implementation lives in plotdoc-client.

pub mod cache;
pub mod mock;
pub mod traits;

pub use cache::{CacheStats, CachedAssociation, DocumentCache, EntryState};
pub use mock::{MockCategorySource, MockDocumentStore, MockUnitSources, QueryGate};
pub use traits::{CategorySource, DocumentService, UnitSources};
