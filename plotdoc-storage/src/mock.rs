//! In-memory mock collaborators for testing.
//!
//! Every mock records the requests it receives so tests can assert exactly
//! which lookups were issued, and supports failure injection per request.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use plotdoc_core::{
    Block, Category, Document, DocumentCreate, DocumentId, DocumentPage, DocumentPatch,
    DocumentQuery, FileMetadata, LandPlot, LookupError, Plot, PropertyId, UnitKind,
};
use tokio::sync::watch;

use crate::traits::{CategorySource, DocumentService, UnitSources};

type QueryPredicate = Box<dyn Fn(&DocumentQuery) -> bool + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_found(id: DocumentId) -> LookupError {
    LookupError::Status {
        status: 404,
        message: format!("document {} not found", id),
    }
}

// ============================================================================
// DOCUMENT STORE
// ============================================================================

/// Holds matching queries until released.
pub struct QueryGate {
    tx: watch::Sender<bool>,
}

impl QueryGate {
    /// Let every held and future matching query proceed.
    pub fn release(&self) {
        self.tx.send_replace(true);
    }
}

/// In-memory document service.
#[derive(Default)]
pub struct MockDocumentStore {
    documents: Mutex<Vec<Document>>,
    last_id: AtomicI64,
    queries: Mutex<Vec<DocumentQuery>>,
    creates: Mutex<Vec<DocumentCreate>>,
    updates: Mutex<Vec<(DocumentId, DocumentPatch)>>,
    deletes: Mutex<Vec<DocumentId>>,
    query_failures: Mutex<Vec<(QueryPredicate, LookupError)>>,
    mutation_failure: Mutex<Option<LookupError>>,
    gates: Mutex<Vec<(QueryPredicate, watch::Receiver<bool>)>>,
}

impl MockDocumentStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `documents`.
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        for doc in documents {
            store.insert(doc);
        }
        store
    }

    /// Insert a document as-is. Later creates get ids above the largest seen.
    pub fn insert(&self, doc: Document) {
        self.last_id.fetch_max(doc.id.get(), Ordering::SeqCst);
        let mut documents = lock(&self.documents);
        documents.retain(|d| d.id != doc.id);
        documents.push(doc);
    }

    pub fn documents(&self) -> Vec<Document> {
        lock(&self.documents).clone()
    }

    pub fn document(&self, id: DocumentId) -> Option<Document> {
        lock(&self.documents).iter().find(|d| d.id == id).cloned()
    }

    /// Every query received, in arrival order.
    pub fn queries(&self) -> Vec<DocumentQuery> {
        lock(&self.queries).clone()
    }

    pub fn query_count(&self) -> usize {
        lock(&self.queries).len()
    }

    pub fn clear_queries(&self) {
        lock(&self.queries).clear();
    }

    pub fn creates(&self) -> Vec<DocumentCreate> {
        lock(&self.creates).clone()
    }

    pub fn updates(&self) -> Vec<(DocumentId, DocumentPatch)> {
        lock(&self.updates).clone()
    }

    pub fn deletes(&self) -> Vec<DocumentId> {
        lock(&self.deletes).clone()
    }

    /// Fail every query matching `predicate` with `error`.
    pub fn fail_queries_where<F>(&self, predicate: F, error: LookupError)
    where
        F: Fn(&DocumentQuery) -> bool + Send + Sync + 'static,
    {
        lock(&self.query_failures).push((Box::new(predicate), error));
    }

    /// Fail every query.
    pub fn fail_all_queries(&self, error: LookupError) {
        self.fail_queries_where(|_| true, error);
    }

    pub fn clear_query_failures(&self) {
        lock(&self.query_failures).clear();
    }

    /// Fail every create, update and delete until cleared.
    pub fn fail_mutations(&self, error: LookupError) {
        *lock(&self.mutation_failure) = Some(error);
    }

    pub fn clear_mutation_failure(&self) {
        *lock(&self.mutation_failure) = None;
    }

    /// Suspend queries matching `predicate` until the returned gate opens.
    pub fn hold_queries_where<F>(&self, predicate: F) -> QueryGate
    where
        F: Fn(&DocumentQuery) -> bool + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(false);
        lock(&self.gates).push((Box::new(predicate), rx));
        QueryGate { tx }
    }

    fn mutation_failure(&self) -> Option<LookupError> {
        lock(&self.mutation_failure).clone()
    }
}

#[async_trait]
impl DocumentService for MockDocumentStore {
    async fn query(&self, query: &DocumentQuery) -> Result<DocumentPage, LookupError> {
        lock(&self.queries).push(query.clone());

        let held: Vec<watch::Receiver<bool>> = lock(&self.gates)
            .iter()
            .filter(|(predicate, _)| predicate(query))
            .map(|(_, rx)| rx.clone())
            .collect();
        for mut rx in held {
            // A dropped gate counts as released.
            let _ = rx.wait_for(|open| *open).await;
        }

        let failure = lock(&self.query_failures)
            .iter()
            .find(|(predicate, _)| predicate(query))
            .map(|(_, error)| error.clone());
        if let Some(error) = failure {
            return Err(error);
        }

        let matching: Vec<Document> = lock(&self.documents)
            .iter()
            .filter(|doc| query.matches(doc))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let limit = query.limit as usize;
        let start = query.page.saturating_sub(1) as usize * limit;
        let documents = matching.into_iter().skip(start).take(limit).collect();
        Ok(DocumentPage { documents, total })
    }

    async fn create(&self, create: &DocumentCreate) -> Result<Document, LookupError> {
        lock(&self.creates).push(create.clone());
        if let Some(error) = self.mutation_failure() {
            return Err(error);
        }

        let now = Utc::now();
        let id = DocumentId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let doc = Document {
            id,
            property_id: create.property_id,
            plot_number: create.plot_number.clone(),
            plot_id: create.plot_id,
            category_id: create.category_id,
            title: create.title.clone(),
            description: create.description.clone(),
            status: create.status,
            tags: create.tags.clone(),
            file: FileMetadata {
                file_name: create.file.file_name.clone(),
                file_size: create.file.bytes.len() as u64,
                mime_type: create.file.content_type.clone(),
            },
            created_at: now,
            updated_at: now,
        };
        lock(&self.documents).push(doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        id: DocumentId,
        patch: &DocumentPatch,
    ) -> Result<Document, LookupError> {
        lock(&self.updates).push((id, patch.clone()));
        if let Some(error) = self.mutation_failure() {
            return Err(error);
        }

        let mut documents = lock(&self.documents);
        let doc = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(id))?;
        if let Some(title) = &patch.title {
            doc.title = title.clone();
        }
        if let Some(description) = &patch.description {
            doc.description = Some(description.clone());
        }
        if let Some(category_id) = patch.category_id {
            doc.category_id = category_id;
        }
        if let Some(tags) = &patch.tags {
            doc.tags = tags.clone();
        }
        if let Some(status) = patch.status {
            doc.status = status;
        }
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, id: DocumentId) -> Result<(), LookupError> {
        lock(&self.deletes).push(id);
        if let Some(error) = self.mutation_failure() {
            return Err(error);
        }

        let mut documents = lock(&self.documents);
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

// ============================================================================
// UNIT SOURCES
// ============================================================================

type Listing<T> = Mutex<HashMap<PropertyId, Result<Vec<T>, LookupError>>>;

/// In-memory plot, land plot and block listings.
///
/// A property with nothing configured lists as empty.
#[derive(Debug, Default)]
pub struct MockUnitSources {
    plots: Listing<Plot>,
    land_plots: Listing<LandPlot>,
    blocks: Listing<Block>,
    calls: Mutex<Vec<(UnitKind, PropertyId)>>,
}

impl MockUnitSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plots(self, property_id: PropertyId, plots: Vec<Plot>) -> Self {
        lock(&self.plots).insert(property_id, Ok(plots));
        self
    }

    pub fn with_land_plots(self, property_id: PropertyId, plots: Vec<LandPlot>) -> Self {
        lock(&self.land_plots).insert(property_id, Ok(plots));
        self
    }

    pub fn with_blocks(self, property_id: PropertyId, blocks: Vec<Block>) -> Self {
        lock(&self.blocks).insert(property_id, Ok(blocks));
        self
    }

    pub fn fail_plots(self, property_id: PropertyId, error: LookupError) -> Self {
        lock(&self.plots).insert(property_id, Err(error));
        self
    }

    pub fn fail_land_plots(self, property_id: PropertyId, error: LookupError) -> Self {
        lock(&self.land_plots).insert(property_id, Err(error));
        self
    }

    pub fn fail_blocks(self, property_id: PropertyId, error: LookupError) -> Self {
        lock(&self.blocks).insert(property_id, Err(error));
        self
    }

    /// Every listing call received, in arrival order.
    pub fn calls(&self) -> Vec<(UnitKind, PropertyId)> {
        lock(&self.calls).clone()
    }

    fn list<T: Clone>(
        &self,
        kind: UnitKind,
        listing: &Listing<T>,
        property_id: PropertyId,
    ) -> Result<Vec<T>, LookupError> {
        lock(&self.calls).push((kind, property_id));
        lock(listing)
            .get(&property_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl UnitSources for MockUnitSources {
    async fn plots(&self, property_id: PropertyId) -> Result<Vec<Plot>, LookupError> {
        self.list(UnitKind::Plot, &self.plots, property_id)
    }

    async fn land_plots(&self, property_id: PropertyId) -> Result<Vec<LandPlot>, LookupError> {
        self.list(UnitKind::LandPlot, &self.land_plots, property_id)
    }

    async fn blocks(&self, property_id: PropertyId) -> Result<Vec<Block>, LookupError> {
        self.list(UnitKind::Block, &self.blocks, property_id)
    }
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Fixed category list, or a fixed failure.
#[derive(Debug)]
pub struct MockCategorySource {
    result: Result<Vec<Category>, LookupError>,
    calls: AtomicUsize,
}

impl MockCategorySource {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            result: Ok(categories),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: LookupError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CategorySource for MockCategorySource {
    async fn categories(&self) -> Result<Vec<Category>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
