//! Document query, filter context and pagination types.
//!
//! A `None` filter key means "do not filter on this dimension", never
//! "match null". Unset keys are omitted from the serialized query string.

use crate::{CategoryId, Document, DocumentStatus, PropertyId, UnitId};
use serde::{Deserialize, Serialize};

/// First page number of every paginated listing.
pub const FIRST_PAGE: u32 = 1;

/// Filtered-list request accepted by the document query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<PropertyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<UnitId>,
    #[serde(rename = "category", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl DocumentQuery {
    /// Query with no filter at all, first page.
    pub fn new(limit: u32) -> Self {
        Self {
            property_id: None,
            plot_number: None,
            plot_id: None,
            category_id: None,
            status: None,
            search: None,
            page: FIRST_PAGE,
            limit,
        }
    }

    pub fn for_property(property_id: PropertyId, limit: u32) -> Self {
        Self {
            property_id: Some(property_id),
            ..Self::new(limit)
        }
    }

    pub fn with_plot_number(mut self, plot_number: impl Into<String>) -> Self {
        self.plot_number = Some(plot_number.into());
        self
    }

    pub fn with_plot_id(mut self, plot_id: UnitId) -> Self {
        self.plot_id = Some(plot_id);
        self
    }

    pub fn with_filters(mut self, filters: &FilterContext) -> Self {
        self.category_id = filters.category_id;
        self.status = filters.status;
        self.search = filters.normalized_search().map(str::to_string);
        self
    }

    pub fn at(mut self, cursor: ListCursor) -> Self {
        self.page = cursor.page;
        self.limit = cursor.limit;
        self
    }

    /// Whether a document satisfies every filter key that is set.
    ///
    /// Search is a case-insensitive substring match on title, description
    /// and tags.
    pub fn matches(&self, doc: &Document) -> bool {
        if self.property_id.is_some_and(|id| id != doc.property_id) {
            return false;
        }
        if let Some(number) = &self.plot_number {
            if !doc.matches_plot_number(number) {
                return false;
            }
        }
        if self.plot_id.is_some() && self.plot_id != doc.plot_id {
            return false;
        }
        if self.category_id.is_some_and(|id| id != doc.category_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != doc.status) {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = doc.title.to_lowercase().contains(&needle);
            let in_description = doc
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            let in_tags = doc.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !(in_title || in_description || in_tags) {
                return false;
            }
        }
        true
    }
}

/// One page of a document listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
    pub total: u64,
}

/// Active search/category/status filters of the document screen.
///
/// Cached unit associations are only valid for the context they were
/// resolved under.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterContext {
    pub category_id: Option<CategoryId>,
    pub status: Option<DocumentStatus>,
    pub search: Option<String>,
}

impl FilterContext {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.status.is_none() && self.normalized_search().is_none()
    }

    /// Search text with surrounding whitespace removed; blank counts as unset.
    pub fn normalized_search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Position in the paginated property-wide document list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCursor {
    pub page: u32,
    pub limit: u32,
}

impl ListCursor {
    pub fn first(limit: u32) -> Self {
        Self {
            page: FIRST_PAGE,
            limit,
        }
    }

    pub fn is_first(&self) -> bool {
        self.page == FIRST_PAGE
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self
        }
    }

    pub fn reset(self) -> Self {
        Self::first(self.limit)
    }
}
