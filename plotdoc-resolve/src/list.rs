//! Paginated property-wide document list.

use plotdoc_core::{
    DocumentPage, DocumentQuery, FilterContext, ListCursor, LookupError, PropertyId,
};
use plotdoc_storage::DocumentService;

/// The document listing of one property under the active filters.
#[derive(Debug, Clone)]
pub struct DocumentList {
    property_id: PropertyId,
    cursor: ListCursor,
    filters: FilterContext,
    page: DocumentPage,
    last_error: Option<LookupError>,
}

impl DocumentList {
    pub fn new(property_id: PropertyId, page_size: u32) -> Self {
        Self {
            property_id,
            cursor: ListCursor::first(page_size),
            filters: FilterContext::default(),
            page: DocumentPage::default(),
            last_error: None,
        }
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub fn cursor(&self) -> ListCursor {
        self.cursor
    }

    pub fn filters(&self) -> &FilterContext {
        &self.filters
    }

    /// Last successfully fetched page.
    pub fn page(&self) -> &DocumentPage {
        &self.page
    }

    pub fn last_error(&self) -> Option<&LookupError> {
        self.last_error.as_ref()
    }

    /// Query for the current cursor and filters.
    pub fn query(&self) -> DocumentQuery {
        DocumentQuery::for_property(self.property_id, self.cursor.limit)
            .with_filters(&self.filters)
            .at(self.cursor)
    }

    /// Fetch the current page. On failure the previous page is kept.
    pub async fn refresh(&mut self, documents: &dyn DocumentService) -> Result<(), LookupError> {
        match documents.query(&self.query()).await {
            Ok(page) => {
                self.page = page;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    property_id = %self.property_id,
                    page = self.cursor.page,
                    error = %e,
                    "Document list refresh failed"
                );
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn reset_to_first_page(&mut self) {
        self.cursor = self.cursor.reset();
    }

    /// Replace the filters. Returns `true` and rewinds to the first page if
    /// they changed.
    pub fn set_filters(&mut self, filters: FilterContext) -> bool {
        if self.filters == filters {
            return false;
        }
        self.filters = filters;
        self.reset_to_first_page();
        true
    }

    /// Advance the cursor if the last page suggests more documents exist.
    pub fn advance(&mut self) -> bool {
        let seen = u64::from(self.cursor.page) * u64::from(self.cursor.limit);
        if seen >= self.page.total {
            return false;
        }
        self.cursor = self.cursor.next();
        true
    }
}
