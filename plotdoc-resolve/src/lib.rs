//! Plotdoc Resolve - Document-to-Unit Resolution
//!
//! Loads the units of a property, resolves which documents belong to each
//! unit through an ordered fallback of lookups, caches the results per unit,
//! and keeps the cache correct across uploads, edits and deletes.
//!
//! Flow: [`UnitCatalog::load`] → [`BulkAssociationLoader::load_all`] fans
//! out one [`DocumentResolver`] flow per unit → results land in the
//! [`DocumentCache`](plotdoc_storage::DocumentCache) → panels read the cache.
//! Writes go through [`MutationCoordinator`], which invalidates afterwards.

pub mod catalog;
pub mod list;
pub mod loader;
pub mod mutation;
pub mod panel;
pub mod resolver;
pub mod session;

pub use catalog::UnitCatalog;
pub use list::DocumentList;
pub use loader::{BulkAssociationLoader, LoadReport, UnitFailure};
pub use mutation::{tag_for_unit, MutationContext, MutationCoordinator};
pub use panel::{PanelBoard, PanelState};
pub use resolver::{
    AssociationResolver, AttemptResult, DocumentResolver, Resolution, ResolverConfig, Tier,
    TierAttempt,
};
pub use session::{Collaborators, PropertySession, SessionConfig, Workspace};
