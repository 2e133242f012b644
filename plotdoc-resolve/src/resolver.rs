//! Tiered document resolution for one unit.
//!
//! Resolution is an ordered pipeline of lookup strategies, run strictly one
//! after another because each tier's necessity depends on the previous
//! tier's answer:
//!
//! 1. [`Tier::BusinessKey`]: `{property_id, plot_number}`, when the unit has
//!    a non-blank plot number.
//! 2. [`Tier::LegacyId`]: `{plot_id: unit.id}`, when tier 1 did not match.
//! 3. [`Tier::PropertyWide`]: `{property_id}`, when no unit was given, or
//!    when no unit tier matched and at least one of them failed. A transport
//!    failure is never reported as "confirmed zero documents".
//!
//! Each tier issues exactly one request. The active [`FilterContext`] is
//! applied to every tier.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use plotdoc_core::{
    Document, DocumentPage, DocumentQuery, FilterContext, LookupError, PlotdocResult, PropertyId,
    ResolutionOutcome, Unit, UnitId,
};
use plotdoc_storage::{CachedAssociation, DocumentService};
use serde::Serialize;

/// Default page size requested by every tier.
pub const DEFAULT_RESOLVE_LIMIT: u32 = 100;

/// One step of the fallback pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    BusinessKey,
    LegacyId,
    PropertyWide,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Tier::BusinessKey => "business_key",
            Tier::LegacyId => "legacy_id",
            Tier::PropertyWide => "property_wide",
        };
        write!(f, "{}", value)
    }
}

/// What a single tier request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// Matches reported by the service, not only those on the first page.
    Found(usize),
    NotFound,
    Transient(LookupError),
}

/// Record of one tier request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierAttempt {
    pub tier: Tier,
    pub query: DocumentQuery,
    pub result: AttemptResult,
}

impl TierAttempt {
    pub fn is_transient(&self) -> bool {
        matches!(self.result, AttemptResult::Transient(_))
    }
}

/// Full outcome of resolving one unit (or a whole property).
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// First page of the answering tier.
    pub documents: Vec<Document>,
    /// Server-side count of the answering tier, which may exceed `documents`.
    pub total: usize,
    pub outcome: ResolutionOutcome,
    pub matched_by: Option<Tier>,
    pub attempts: Vec<TierAttempt>,
}

impl Resolution {
    /// Tiers that issued a request, in order.
    pub fn tiers_run(&self) -> Vec<Tier> {
        self.attempts.iter().map(|a| a.tier).collect()
    }

    /// The most recent transport failure, if any tier failed.
    pub fn last_error(&self) -> Option<&LookupError> {
        self.attempts.iter().rev().find_map(|a| match &a.result {
            AttemptResult::Transient(e) => Some(e),
            _ => None,
        })
    }

    pub fn into_cached(self) -> CachedAssociation {
        CachedAssociation::new(self.documents, self.outcome).with_total(self.total)
    }
}

/// A lookup strategy of the pipeline, carrying the identity it matches on.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Strategy {
    BusinessKey { plot_number: String },
    LegacyId { plot_id: UnitId },
    PropertyWide,
}

impl Strategy {
    fn tier(&self) -> Tier {
        match self {
            Strategy::BusinessKey { .. } => Tier::BusinessKey,
            Strategy::LegacyId { .. } => Tier::LegacyId,
            Strategy::PropertyWide => Tier::PropertyWide,
        }
    }

    fn query(&self, property_id: PropertyId, filters: &FilterContext, limit: u32) -> DocumentQuery {
        let query = match self {
            Strategy::BusinessKey { plot_number } => {
                DocumentQuery::for_property(property_id, limit).with_plot_number(plot_number.clone())
            }
            // Legacy associations are matched on the foreign key alone.
            Strategy::LegacyId { plot_id } => DocumentQuery::new(limit).with_plot_id(*plot_id),
            Strategy::PropertyWide => DocumentQuery::for_property(property_id, limit),
        };
        query.with_filters(filters)
    }
}

/// Configuration for [`DocumentResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Page size of every tier request.
    pub limit: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESOLVE_LIMIT,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Resolves which documents belong to a unit.
#[derive(Clone)]
pub struct DocumentResolver {
    documents: Arc<dyn DocumentService>,
    filters: FilterContext,
    config: ResolverConfig,
}

impl DocumentResolver {
    pub fn new(documents: Arc<dyn DocumentService>, config: ResolverConfig) -> Self {
        Self {
            documents,
            filters: FilterContext::default(),
            config,
        }
    }

    /// Resolver for the same service under a different filter context.
    pub fn with_filters(mut self, filters: FilterContext) -> Self {
        self.filters = filters;
        self
    }

    pub fn filters(&self) -> &FilterContext {
        &self.filters
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Documents for `unit`, or for the whole property when `unit` is `None`.
    ///
    /// Never fails: a resolution in which every tier failed yields an empty
    /// list. Use [`resolve_detailed`](Self::resolve_detailed) to tell that
    /// apart from a confirmed-empty answer.
    pub async fn resolve(&self, property_id: PropertyId, unit: Option<&Unit>) -> Vec<Document> {
        self.resolve_detailed(property_id, unit).await.documents
    }

    pub async fn resolve_detailed(&self, property_id: PropertyId, unit: Option<&Unit>) -> Resolution {
        let mut attempts = Vec::new();

        let Some(unit) = unit else {
            return match self.attempt(Strategy::PropertyWide, property_id, &mut attempts).await {
                Some(page) if !page.documents.is_empty() => {
                    matched(Tier::PropertyWide, page, attempts)
                }
                Some(_) => confirmed_empty(attempts),
                None => failed(attempts),
            };
        };

        if let Some(plot_number) = unit.plot_number() {
            let strategy = Strategy::BusinessKey {
                plot_number: plot_number.to_string(),
            };
            if let Some(page) = self.attempt(strategy, property_id, &mut attempts).await {
                if !page.documents.is_empty() {
                    return matched(Tier::BusinessKey, page, attempts);
                }
            }
        }

        let strategy = Strategy::LegacyId { plot_id: unit.id() };
        if let Some(page) = self.attempt(strategy, property_id, &mut attempts).await {
            if !page.documents.is_empty() {
                return matched(Tier::LegacyId, page, attempts);
            }
        }

        if !attempts.iter().any(TierAttempt::is_transient) {
            return confirmed_empty(attempts);
        }

        match self.attempt(Strategy::PropertyWide, property_id, &mut attempts).await {
            Some(page) => {
                tracing::info!(
                    property_id = %property_id,
                    unit = %unit.key(),
                    documents = page.total,
                    "Unit lookup failed, showing property-wide documents"
                );
                Resolution {
                    matched_by: (!page.documents.is_empty()).then_some(Tier::PropertyWide),
                    total: page_total(&page),
                    documents: page.documents,
                    outcome: ResolutionOutcome::Degraded,
                    attempts,
                }
            }
            None => failed(attempts),
        }
    }

    /// Run one tier. `Some(page)` when the service answered (possibly
    /// empty), `None` on a transport failure.
    async fn attempt(
        &self,
        strategy: Strategy,
        property_id: PropertyId,
        attempts: &mut Vec<TierAttempt>,
    ) -> Option<DocumentPage> {
        let tier = strategy.tier();
        let query = strategy.query(property_id, &self.filters, self.config.limit);
        let (result, page) = match self.documents.query(&query).await {
            Ok(page) if page.documents.is_empty() => (AttemptResult::NotFound, Some(page)),
            Ok(page) => (AttemptResult::Found(page_total(&page)), Some(page)),
            Err(e) => {
                tracing::warn!(
                    property_id = %property_id,
                    tier = %tier,
                    error = %e,
                    "Document lookup failed"
                );
                (AttemptResult::Transient(e), None)
            }
        };
        tracing::debug!(property_id = %property_id, tier = %tier, result = ?result, "Tier finished");
        attempts.push(TierAttempt {
            tier,
            query,
            result,
        });
        page
    }
}

/// Full match count of a page, never below what the page carries.
fn page_total(page: &DocumentPage) -> usize {
    usize::try_from(page.total)
        .unwrap_or(usize::MAX)
        .max(page.documents.len())
}

fn matched(tier: Tier, page: DocumentPage, attempts: Vec<TierAttempt>) -> Resolution {
    Resolution {
        total: page_total(&page),
        documents: page.documents,
        outcome: ResolutionOutcome::Matched,
        matched_by: Some(tier),
        attempts,
    }
}

fn confirmed_empty(attempts: Vec<TierAttempt>) -> Resolution {
    Resolution {
        documents: Vec::new(),
        total: 0,
        outcome: ResolutionOutcome::ConfirmedEmpty,
        matched_by: None,
        attempts,
    }
}

fn failed(attempts: Vec<TierAttempt>) -> Resolution {
    Resolution {
        documents: Vec::new(),
        total: 0,
        outcome: ResolutionOutcome::Failed,
        matched_by: None,
        attempts,
    }
}

/// Seam used by the bulk loader to resolve one unit.
///
/// An `Err` stands for a resolution flow that broke down entirely, as
/// opposed to one whose lookups failed (which is reported through
/// [`ResolutionOutcome::Failed`]).
#[async_trait]
pub trait AssociationResolver: Send + Sync {
    async fn resolve_unit(&self, property_id: PropertyId, unit: &Unit) -> PlotdocResult<Resolution>;
}

#[async_trait]
impl AssociationResolver for DocumentResolver {
    async fn resolve_unit(&self, property_id: PropertyId, unit: &Unit) -> PlotdocResult<Resolution> {
        Ok(self.resolve_detailed(property_id, Some(unit)).await)
    }
}
