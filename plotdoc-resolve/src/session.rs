//! Property-scoped session state and its lifecycle.
//!
//! A [`PropertySession`] is built when a property is opened and dropped when
//! another one is opened. The [`Workspace`] owns the current session and the
//! document cache shared by all sessions.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join;
use plotdoc_core::{
    Category, Document, DocumentId, DocumentPatch, FilterContext, LookupError, PlotdocResult,
    PropertyId, Unit, UnitKey, UploadRequest,
};
use plotdoc_storage::{CategorySource, DocumentCache, DocumentService, UnitSources};

use crate::catalog::UnitCatalog;
use crate::list::DocumentList;
use crate::loader::{BulkAssociationLoader, LoadReport};
use crate::mutation::{MutationContext, MutationCoordinator};
use crate::panel::{PanelBoard, PanelState};
use crate::resolver::{DocumentResolver, ResolverConfig, DEFAULT_RESOLVE_LIMIT};

/// Default page size of the property-wide document list.
pub const DEFAULT_LIST_PAGE_SIZE: u32 = 20;

/// External services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub documents: Arc<dyn DocumentService>,
    pub units: Arc<dyn UnitSources>,
    pub categories: Arc<dyn CategorySource>,
}

/// Session tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Page size of every resolver tier.
    pub resolve_limit: u32,
    pub list_page_size: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolve_limit: DEFAULT_RESOLVE_LIMIT,
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolve_limit(mut self, limit: u32) -> Self {
        self.resolve_limit = limit;
        self
    }

    pub fn with_list_page_size(mut self, size: u32) -> Self {
        self.list_page_size = size;
        self
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new().with_limit(self.resolve_limit)
    }
}

/// Everything the document screen holds for one open property.
pub struct PropertySession {
    property_id: PropertyId,
    collaborators: Collaborators,
    config: SessionConfig,
    cache: Arc<DocumentCache>,
    catalog: UnitCatalog,
    categories: Vec<Category>,
    filters: FilterContext,
    loader: BulkAssociationLoader,
    coordinator: MutationCoordinator,
    list: DocumentList,
    panels: PanelBoard,
}

impl PropertySession {
    /// Load the unit catalog and the category list concurrently.
    ///
    /// Neither can fail the session: degraded unit listings are empty, and a
    /// failed category list is treated as unknown (empty).
    pub async fn open(
        collaborators: Collaborators,
        config: SessionConfig,
        cache: Arc<DocumentCache>,
        property_id: PropertyId,
    ) -> Self {
        let (catalog, categories) = join(
            UnitCatalog::load(collaborators.units.as_ref(), property_id),
            collaborators.categories.categories(),
        )
        .await;
        let categories = categories.unwrap_or_else(|e| {
            tracing::warn!(property_id = %property_id, error = %e, "Category list unavailable");
            Vec::new()
        });

        let filters = FilterContext::default();
        let (loader, coordinator) = wire(&collaborators, &config, &cache, &filters);
        let list = DocumentList::new(property_id, config.list_page_size);

        tracing::info!(
            property_id = %property_id,
            units = catalog.len(),
            categories = categories.len(),
            "Property session opened"
        );

        Self {
            property_id,
            collaborators,
            config,
            cache,
            catalog,
            categories,
            filters,
            loader,
            coordinator,
            list,
            panels: PanelBoard::new(),
        }
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn filters(&self) -> &FilterContext {
        &self.filters
    }

    pub fn list(&self) -> &DocumentList {
        &self.list
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve every unit of the catalog into the cache.
    pub async fn load_all(&self) -> LoadReport {
        self.start_load().await
    }

    /// A bulk load of the current catalog as a `'static` future the caller
    /// may spawn.
    ///
    /// The future does nothing until polled. Once started it is never
    /// cancelled, and it writes into the shared cache even after this
    /// session has been replaced.
    pub fn start_load(&self) -> impl Future<Output = LoadReport> + Send + 'static {
        let loader = self.loader.clone();
        let property_id = self.property_id;
        let units = self.catalog.units();
        async move { loader.load_all(property_id, &units).await }
    }

    /// Documents of `unit`, from the cache or freshly resolved on a miss.
    pub async fn documents_for(&self, unit: &Unit) -> Arc<[Document]> {
        self.loader.get_or_resolve(self.property_id, unit).await
    }

    /// Open the panel of `key`, resolving the unit first on a cache miss.
    ///
    /// Returns `None` if the unit is not part of the catalog.
    pub async fn expand(&mut self, key: UnitKey) -> Option<PanelState> {
        let unit = self.catalog.find(key)?;
        if let Some(entry) = self.cache.entry(&key).await {
            let state = PanelState::from_association(&entry);
            self.panels.transition(key, state.clone());
            return Some(state);
        }

        self.panels.transition(key, PanelState::Loading);
        let entry = self.loader.refresh(self.property_id, &unit).await;
        let state = PanelState::from_association(&entry);
        self.panels.transition(key, state.clone());
        Some(state)
    }

    pub fn collapse(&mut self, key: UnitKey) {
        self.panels.collapse(key);
    }

    pub fn panel(&self, key: &UnitKey) -> PanelState {
        self.panels.state(key)
    }

    pub fn panels(&self) -> &PanelBoard {
        &self.panels
    }

    /// Switch the filter context. Every cached association was resolved
    /// under the old context, so a change invalidates the whole cache and
    /// rewinds the list. Returns `false` if nothing changed.
    pub async fn set_filters(&mut self, filters: FilterContext) -> bool {
        if self.filters == filters {
            return false;
        }
        let invalidated = self.cache.invalidate_all().await;
        tracing::debug!(property_id = %self.property_id, invalidated, "Filter context changed");

        let (loader, coordinator) = wire(&self.collaborators, &self.config, &self.cache, &filters);
        self.loader = loader;
        self.coordinator = coordinator;
        self.list.set_filters(filters.clone());
        self.filters = filters;
        self.panels.reset();
        true
    }

    pub async fn refresh_list(&mut self) -> Result<(), LookupError> {
        self.list.refresh(self.collaborators.documents.as_ref()).await
    }

    /// Fetch the next page of the list. `Ok(false)` when already on the last
    /// page.
    pub async fn next_page(&mut self) -> Result<bool, LookupError> {
        if !self.list.advance() {
            return Ok(false);
        }
        self.refresh_list().await?;
        Ok(true)
    }

    /// Upload a document, optionally for `target`, and update that unit's
    /// panel if it is open.
    pub async fn upload(
        &mut self,
        request: &UploadRequest,
        target: Option<&Unit>,
    ) -> PlotdocResult<Document> {
        let ctx = MutationContext {
            property_id: self.property_id,
            categories: &self.categories,
            list: &mut self.list,
        };
        let (document, refreshed) = self.coordinator.upload(ctx, request, target).await?;

        if let (Some(unit), Some(entry)) = (target, refreshed) {
            let key = unit.key();
            if self.panels.state(&key) != PanelState::Collapsed {
                self.panels.transition(key, PanelState::from_association(&entry));
            }
        }
        Ok(document)
    }

    pub async fn update_document(
        &mut self,
        id: DocumentId,
        patch: &DocumentPatch,
    ) -> PlotdocResult<Document> {
        let ctx = MutationContext {
            property_id: self.property_id,
            categories: &self.categories,
            list: &mut self.list,
        };
        self.coordinator.update(ctx, id, patch).await
    }

    pub async fn delete_document(&mut self, id: DocumentId) -> PlotdocResult<()> {
        let ctx = MutationContext {
            property_id: self.property_id,
            categories: &self.categories,
            list: &mut self.list,
        };
        self.coordinator.delete(ctx, id).await
    }
}

fn wire(
    collaborators: &Collaborators,
    config: &SessionConfig,
    cache: &Arc<DocumentCache>,
    filters: &FilterContext,
) -> (BulkAssociationLoader, MutationCoordinator) {
    let resolver = DocumentResolver::new(
        Arc::clone(&collaborators.documents),
        config.resolver_config(),
    )
    .with_filters(filters.clone());
    let loader = BulkAssociationLoader::new(Arc::new(resolver), Arc::clone(cache));
    let coordinator = MutationCoordinator::new(Arc::clone(&collaborators.documents), loader.clone());
    (loader, coordinator)
}

/// Holds the open property session and the cache shared across sessions.
pub struct Workspace {
    collaborators: Collaborators,
    config: SessionConfig,
    cache: Arc<DocumentCache>,
    session: Option<PropertySession>,
}

impl Workspace {
    pub fn new(collaborators: Collaborators, config: SessionConfig) -> Self {
        Self {
            collaborators,
            config,
            cache: Arc::new(DocumentCache::new()),
            session: None,
        }
    }

    /// Drop the current session, clear the cache, and open `property_id`.
    ///
    /// Loads started by the previous session are not cancelled.
    pub async fn open_property(&mut self, property_id: PropertyId) -> &mut PropertySession {
        if let Some(previous) = self.session.take() {
            tracing::debug!(
                from = %previous.property_id(),
                to = %property_id,
                "Switching property"
            );
        }
        self.cache.clear().await;
        let session = PropertySession::open(
            self.collaborators.clone(),
            self.config.clone(),
            Arc::clone(&self.cache),
            property_id,
        )
        .await;
        self.session.insert(session)
    }

    pub fn session(&self) -> Option<&PropertySession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut PropertySession> {
        self.session.as_mut()
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }
}
