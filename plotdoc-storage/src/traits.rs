//! Async traits for the external collaborators.
//!
//! Every method reports failure as a [`LookupError`] so callers never depend
//! on transport types. Implementations must be safe to call concurrently.

use async_trait::async_trait;
use plotdoc_core::{
    Block, Category, Document, DocumentCreate, DocumentId, DocumentPage, DocumentPatch,
    DocumentQuery, LandPlot, LookupError, Plot, PropertyId,
};

/// Document query, create, update and delete endpoints.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Filtered listing. Unset query keys do not filter.
    async fn query(&self, query: &DocumentQuery) -> Result<DocumentPage, LookupError>;

    /// Upload a new document.
    async fn create(&self, create: &DocumentCreate) -> Result<Document, LookupError>;

    /// Apply a partial update.
    async fn update(&self, id: DocumentId, patch: &DocumentPatch)
        -> Result<Document, LookupError>;

    /// Delete a document by id.
    async fn delete(&self, id: DocumentId) -> Result<(), LookupError>;
}

/// The three independent unit listings of a property.
///
/// Each method may fail on its own; an `Ok` list may be empty.
#[async_trait]
pub trait UnitSources: Send + Sync {
    async fn plots(&self, property_id: PropertyId) -> Result<Vec<Plot>, LookupError>;

    async fn land_plots(&self, property_id: PropertyId) -> Result<Vec<LandPlot>, LookupError>;

    async fn blocks(&self, property_id: PropertyId) -> Result<Vec<Block>, LookupError>;
}

/// Flat category list used to validate and display `category_id`.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>, LookupError>;
}
