//! Fan-out/fan-in resolution of every unit of a property.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;
use plotdoc_core::{
    Document, PlotdocError, PlotdocResult, PropertyId, ResolutionOutcome, Unit, UnitKey,
};
use plotdoc_storage::{CachedAssociation, DocumentCache};

use crate::resolver::{AssociationResolver, Resolution};

/// A unit whose resolution did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub key: UnitKey,
    pub error: String,
}

/// Result of one [`BulkAssociationLoader::load_all`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Documents per unit, including the empty list of every failed unit.
    pub associations: BTreeMap<UnitKey, Vec<Document>>,
    /// Full document count per unit, which may exceed the fetched list.
    pub totals: BTreeMap<UnitKey, usize>,
    pub outcomes: BTreeMap<UnitKey, ResolutionOutcome>,
    pub failed: Vec<UnitFailure>,
}

impl LoadReport {
    /// Number of units that resolved without failure.
    pub fn resolved(&self) -> usize {
        self.associations.len().saturating_sub(self.failed.len())
    }

    pub fn documents(&self, key: &UnitKey) -> Option<&[Document]> {
        self.associations.get(key).map(Vec::as_slice)
    }

    pub fn total(&self, key: &UnitKey) -> Option<usize> {
        self.totals.get(key).copied()
    }

    pub fn outcome(&self, key: &UnitKey) -> Option<ResolutionOutcome> {
        self.outcomes.get(key).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resolves many units concurrently and stores each result in the shared
/// cache.
#[derive(Clone)]
pub struct BulkAssociationLoader {
    resolver: Arc<dyn AssociationResolver>,
    cache: Arc<DocumentCache>,
}

impl BulkAssociationLoader {
    pub fn new(resolver: Arc<dyn AssociationResolver>, cache: Arc<DocumentCache>) -> Self {
        Self { resolver, cache }
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    /// Resolve every unit at once and wait for all of them.
    ///
    /// No concurrency cap is applied: one flow per unit is started
    /// immediately. Each flow writes its own cache entry as soon as it
    /// finishes. A failed flow is cached as an empty list with outcome
    /// [`ResolutionOutcome::Failed`] and never affects its siblings.
    pub async fn load_all(&self, property_id: PropertyId, units: &[Unit]) -> LoadReport {
        let flows = units.iter().cloned().map(|unit| {
            let loader = self.clone();
            async move {
                let resolved = loader.resolve_and_store(property_id, &unit).await;
                (unit.key(), resolved)
            }
        });
        let results = join_all(flows).await;

        let mut report = LoadReport::default();
        for (key, resolved) in results {
            if let Some(error) = resolved.error {
                report.failed.push(UnitFailure { key, error });
            }
            report.outcomes.insert(key, resolved.association.outcome);
            report.totals.insert(key, resolved.association.total);
            report
                .associations
                .insert(key, resolved.association.documents.to_vec());
        }

        tracing::debug!(
            property_id = %property_id,
            units = units.len(),
            failed = report.failed.len(),
            "Bulk association load finished"
        );
        report
    }

    /// Cached documents for `unit`, resolving only on a miss.
    pub async fn get_or_resolve(&self, property_id: PropertyId, unit: &Unit) -> Arc<[Document]> {
        if let Some(documents) = self.cache.get(&unit.key()).await {
            return documents;
        }
        self.refresh(property_id, unit).await.documents
    }

    /// Resolve `unit` again regardless of the cache and store the result.
    pub async fn refresh(&self, property_id: PropertyId, unit: &Unit) -> CachedAssociation {
        self.resolve_and_store(property_id, unit).await.association
    }

    async fn resolve_and_store(&self, property_id: PropertyId, unit: &Unit) -> Resolved {
        let key = unit.key();
        let resolved = Resolved::from_result(self.resolver.resolve_unit(property_id, unit).await);
        if let Some(error) = &resolved.error {
            tracing::warn!(
                property_id = %property_id,
                unit = %key,
                error = %error,
                "Unit resolution failed"
            );
        }
        self.cache.set(key, resolved.association.clone()).await;
        resolved
    }
}

struct Resolved {
    association: CachedAssociation,
    error: Option<String>,
}

impl Resolved {
    fn from_result(result: PlotdocResult<Resolution>) -> Self {
        match result {
            Ok(resolution) if resolution.outcome == ResolutionOutcome::Failed => {
                let error = resolution
                    .last_error()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "every lookup failed".to_string());
                Self {
                    association: resolution.into_cached(),
                    error: Some(error),
                }
            }
            Ok(resolution) => Self {
                association: resolution.into_cached(),
                error: None,
            },
            Err(e) => Self::failed(&e),
        }
    }

    fn failed(error: &PlotdocError) -> Self {
        Self {
            association: CachedAssociation::new(Vec::new(), ResolutionOutcome::Failed),
            error: Some(error.to_string()),
        }
    }
}
