//! Upload, update and delete with the cache invalidation each one implies.
//!
//! | operation | on success | on failure |
//! |---|---|---|
//! | upload | list back to page 1 and refetched; the target unit's entry is invalidated and re-resolved | nothing changes |
//! | update | every entry invalidated; list refetched | nothing changes |
//! | delete | every entry invalidated; list refetched | nothing changes |
//!
//! Units invalidated by an update or delete are re-resolved the next time
//! they are read.

use std::sync::Arc;

use plotdoc_core::{
    Category, Document, DocumentCreate, DocumentId, DocumentPatch, MutationError,
    PlotdocResult, PropertyId, Unit, UploadRequest, ValidatedUpload, ValidationError,
};
use plotdoc_storage::{CachedAssociation, DocumentCache, DocumentService};

use crate::list::DocumentList;
use crate::loader::BulkAssociationLoader;

/// Build the create payload for an upload, tagged with both identities of
/// the target unit.
///
/// `plot_number` is set only when the unit has one. `plot_id` is always the
/// unit's id so that the legacy lookup also finds the document.
pub fn tag_for_unit(
    upload: ValidatedUpload,
    property_id: PropertyId,
    unit: Option<&Unit>,
) -> DocumentCreate {
    let mut create = DocumentCreate::untargeted(upload, property_id);
    if let Some(unit) = unit {
        create.plot_number = unit.plot_number().map(str::to_string);
        create.plot_id = Some(unit.id());
        create.plot_type = Some(unit.kind().plot_type());
    }
    create
}

/// Session state a mutation reads and updates.
pub struct MutationContext<'a> {
    pub property_id: PropertyId,
    /// Known categories. Empty when the list could not be loaded.
    pub categories: &'a [Category],
    pub list: &'a mut DocumentList,
}

/// Performs document writes and keeps the cache consistent with them.
#[derive(Clone)]
pub struct MutationCoordinator {
    documents: Arc<dyn DocumentService>,
    loader: BulkAssociationLoader,
}

impl MutationCoordinator {
    pub fn new(documents: Arc<dyn DocumentService>, loader: BulkAssociationLoader) -> Self {
        Self { documents, loader }
    }

    fn cache(&self) -> &DocumentCache {
        self.loader.cache()
    }

    /// Validate and upload a document, optionally for a target unit.
    ///
    /// Returns the created document and, when a unit was targeted, its fresh
    /// cache entry.
    pub async fn upload(
        &self,
        ctx: MutationContext<'_>,
        request: &UploadRequest,
        target: Option<&Unit>,
    ) -> PlotdocResult<(Document, Option<CachedAssociation>)> {
        let upload = request.validate(ctx.categories)?;
        let create = tag_for_unit(upload, ctx.property_id, target);

        let document = self.documents.create(&create).await.map_err(|source| {
            tracing::warn!(property_id = %ctx.property_id, error = %source, "Upload failed");
            MutationError::Create { source }
        })?;

        ctx.list.reset_to_first_page();
        self.refresh_list(ctx.list).await;

        let refreshed = match target {
            Some(unit) => {
                self.cache().invalidate(&unit.key()).await;
                tracing::debug!(unit = %unit.key(), document = %document.id, "Unit invalidated after upload");
                Some(self.loader.refresh(ctx.property_id, unit).await)
            }
            None => None,
        };
        Ok((document, refreshed))
    }

    /// Apply `patch` to a document, then invalidate every cached unit.
    pub async fn update(
        &self,
        ctx: MutationContext<'_>,
        id: DocumentId,
        patch: &DocumentPatch,
    ) -> PlotdocResult<Document> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyPatch.into());
        }
        let document = self.documents.update(id, patch).await.map_err(|source| {
            tracing::warn!(document = %id, error = %source, "Update failed");
            MutationError::Update { id, source }
        })?;
        self.invalidate_context(ctx.list).await;
        Ok(document)
    }

    /// Delete a document, then invalidate every cached unit.
    pub async fn delete(&self, ctx: MutationContext<'_>, id: DocumentId) -> PlotdocResult<()> {
        self.documents.delete(id).await.map_err(|source| {
            tracing::warn!(document = %id, error = %source, "Delete failed");
            MutationError::Delete { id, source }
        })?;
        self.invalidate_context(ctx.list).await;
        Ok(())
    }

    async fn invalidate_context(&self, list: &mut DocumentList) {
        let invalidated = self.cache().invalidate_all().await;
        tracing::debug!(invalidated, "Cache invalidated after document change");
        self.refresh_list(list).await;
    }

    // The write already happened, so a failed list refetch is only logged.
    async fn refresh_list(&self, list: &mut DocumentList) {
        let _ = list.refresh(self.documents.as_ref()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotdoc_core::{CategoryId, PlotType, UnitId};
    use plotdoc_test_utils::fixtures::{block, land_plot, upload_request};

    #[test]
    fn test_tag_for_numbered_unit_sets_both_identities() {
        let upload = upload_request(CategoryId::new(1)).validate(&[]).unwrap();
        let unit = land_plot(12, Some("B-12"));
        let create = tag_for_unit(upload, PropertyId::new(42), Some(&unit));

        assert_eq!(create.property_id, PropertyId::new(42));
        assert_eq!(create.plot_number.as_deref(), Some("B-12"));
        assert_eq!(create.plot_id, Some(UnitId::new(12)));
        assert_eq!(create.plot_type, Some(PlotType::LandPlot));
    }

    #[test]
    fn test_tag_for_block_sets_plot_id_only() {
        let upload = upload_request(CategoryId::new(1)).validate(&[]).unwrap();
        let create = tag_for_unit(upload, PropertyId::new(42), Some(&block(3)));

        assert_eq!(create.plot_number, None);
        assert_eq!(create.plot_id, Some(UnitId::new(3)));
        assert_eq!(create.plot_type, Some(PlotType::PropertyBlock));
    }

    #[test]
    fn test_untargeted_upload_has_no_unit_identity() {
        let upload = upload_request(CategoryId::new(1)).validate(&[]).unwrap();
        let create = tag_for_unit(upload, PropertyId::new(42), None);

        assert_eq!(create.plot_number, None);
        assert_eq!(create.plot_id, None);
        assert_eq!(create.plot_type, None);
    }
}
