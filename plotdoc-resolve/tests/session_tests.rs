//! Session lifecycle, panels, filters and mutation behaviour.

use std::sync::Arc;

use plotdoc_core::{
    CategoryId, DocumentId, DocumentPatch, DocumentStatus, FilterContext, LookupError, Plot,
    PropertyId, UnitId, UnitKey, UnitKind, UploadRequest, ValidationError,
};
use plotdoc_resolve::{Collaborators, PanelState, PropertySession, SessionConfig, Workspace};
use plotdoc_storage::{
    DocumentCache, EntryState, MockCategorySource, MockDocumentStore, MockUnitSources,
};
use plotdoc_test_utils::assertions::{
    assert_document_ids, assert_missing_field, assert_mutation_error, assert_validation_error,
};
use plotdoc_test_utils::fixtures::{
    legacy_document, legacy_property, numbered_document, standard_categories, upload_request,
};
use plotdoc_test_utils::PlotdocError;

fn plot(id: i64, number: &str) -> Plot {
    Plot {
        id: UnitId::new(id),
        plot_number: Some(number.to_string()),
        area: None,
        price: None,
        status: None,
    }
}

fn key(kind: UnitKind, id: i64) -> UnitKey {
    UnitKey::new(kind, UnitId::new(id))
}

async fn open_legacy_session() -> (PropertySession, Arc<MockDocumentStore>) {
    let (units, store) = legacy_property();
    let collaborators = Collaborators {
        documents: store.clone(),
        units,
        categories: Arc::new(MockCategorySource::new(standard_categories())),
    };
    let session = PropertySession::open(
        collaborators,
        SessionConfig::default(),
        Arc::new(DocumentCache::new()),
        PropertyId::new(42),
    )
    .await;
    (session, store)
}

// ============================================================================
// PANELS
// ============================================================================

#[tokio::test]
async fn expand_on_miss_goes_through_loading() {
    let (mut session, store) = open_legacy_session().await;
    let unit = key(UnitKind::LandPlot, 7);

    assert_eq!(session.panel(&unit), PanelState::Collapsed);
    assert_eq!(session.expand(unit).await, Some(PanelState::Loaded(1)));
    assert_eq!(
        session.panels().history(&unit),
        &[PanelState::Loading, PanelState::Loaded(1)]
    );

    // A second expand is served from the cache without a Loading phase.
    session.collapse(unit);
    let queries = store.query_count();
    assert_eq!(session.expand(unit).await, Some(PanelState::Loaded(1)));
    assert_eq!(store.query_count(), queries);
    assert_eq!(
        session.panels().history(&unit),
        &[
            PanelState::Loading,
            PanelState::Loaded(1),
            PanelState::Collapsed,
            PanelState::Loaded(1)
        ]
    );
}

#[tokio::test]
async fn empty_and_error_panels_are_distinct() {
    let (mut session, store) = open_legacy_session().await;
    let empty = key(UnitKind::LandPlot, 12);
    assert_eq!(session.expand(empty).await, Some(PanelState::Empty));

    store.fail_all_queries(LookupError::transport("offline"));
    session.cache().clear().await;
    let failed = session.expand(key(UnitKind::LandPlot, 7)).await;
    assert!(matches!(failed, Some(PanelState::Error(_))));
}

#[tokio::test]
async fn expand_unknown_unit_is_none() {
    let (mut session, _) = open_legacy_session().await;
    assert_eq!(session.expand(key(UnitKind::Block, 1)).await, None);
}

// ============================================================================
// FILTERS
// ============================================================================

#[tokio::test]
async fn changing_filters_invalidates_cache_and_rewinds_list() {
    let (mut session, store) = open_legacy_session().await;
    session.load_all().await;
    let unit = key(UnitKind::LandPlot, 7);
    session.expand(unit).await;

    let filters = FilterContext {
        status: Some(DocumentStatus::Archived),
        ..FilterContext::default()
    };
    assert!(session.set_filters(filters.clone()).await);
    assert!(!session.set_filters(filters).await);

    assert_eq!(session.cache().state(&unit).await, EntryState::Stale);
    assert_eq!(session.panel(&unit), PanelState::Collapsed);
    assert!(session.list().cursor().is_first());

    store.clear_queries();
    assert_eq!(session.expand(unit).await, Some(PanelState::Empty));
    for query in store.queries() {
        assert_eq!(query.status, Some(DocumentStatus::Archived));
    }
}

// ============================================================================
// MUTATIONS
// ============================================================================

#[tokio::test]
async fn upload_validation_happens_before_any_request() {
    let (mut session, store) = open_legacy_session().await;
    let queries = store.query_count();

    let no_title = UploadRequest {
        title: "   ".to_string(),
        ..upload_request(CategoryId::new(1))
    };
    assert_missing_field(&session.upload(&no_title, None).await, "title");

    let no_file = UploadRequest {
        file: None,
        ..upload_request(CategoryId::new(1))
    };
    assert_missing_field(&session.upload(&no_file, None).await, "file");

    let no_category = UploadRequest {
        category_id: None,
        ..upload_request(CategoryId::new(1))
    };
    assert_missing_field(&session.upload(&no_category, None).await, "category");

    let unknown = session.upload(&upload_request(CategoryId::new(77)), None).await;
    assert_eq!(
        unknown.unwrap_err(),
        PlotdocError::Validation(ValidationError::UnknownCategory {
            category_id: CategoryId::new(77)
        })
    );

    assert!(store.creates().is_empty());
    assert_eq!(store.query_count(), queries);
}

#[tokio::test]
async fn unavailable_categories_do_not_block_uploads() {
    let (units, store) = legacy_property();
    let collaborators = Collaborators {
        documents: store.clone(),
        units,
        categories: Arc::new(MockCategorySource::failing(LookupError::transport("down"))),
    };
    let mut session = PropertySession::open(
        collaborators,
        SessionConfig::default(),
        Arc::new(DocumentCache::new()),
        PropertyId::new(42),
    )
    .await;

    assert!(session.categories().is_empty());
    assert!(session
        .upload(&upload_request(CategoryId::new(77)), None)
        .await
        .is_ok());
}

#[tokio::test]
async fn empty_patch_is_rejected_without_request() {
    let (mut session, store) = open_legacy_session().await;
    let result = session
        .update_document(DocumentId::new(1), &DocumentPatch::default())
        .await;
    assert_validation_error(&result);
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn failed_mutations_leave_cache_untouched() {
    let (mut session, store) = open_legacy_session().await;
    session.load_all().await;
    let keys = session.cache().present_keys().await;
    assert_eq!(keys.len(), 2);

    store.fail_mutations(LookupError::Status {
        status: 500,
        message: "boom".to_string(),
    });

    let patch = DocumentPatch {
        title: Some("Renamed".to_string()),
        ..DocumentPatch::default()
    };
    assert_mutation_error(&session.update_document(DocumentId::new(1), &patch).await);
    assert_mutation_error(&session.delete_document(DocumentId::new(1)).await);
    let unit = session.catalog().find(keys[0]).unwrap();
    assert_mutation_error(
        &session
            .upload(&upload_request(CategoryId::new(1)), Some(&unit))
            .await,
    );

    assert_eq!(session.cache().present_keys().await, keys);
    assert_eq!(session.cache().stats().await.invalidations, 0);
}

#[tokio::test]
async fn upload_only_invalidates_target_unit() {
    let (mut session, store) = open_legacy_session().await;
    session.load_all().await;
    let target = key(UnitKind::LandPlot, 12);
    let other = key(UnitKind::LandPlot, 7);
    assert_eq!(session.expand(target).await, Some(PanelState::Empty));

    let unit = session.catalog().find(target).unwrap();
    store.clear_queries();
    let created = session
        .upload(&upload_request(CategoryId::new(1)), Some(&unit))
        .await
        .unwrap();

    // Target re-resolved eagerly; its open panel follows.
    assert_eq!(session.cache().state(&target).await, EntryState::Present);
    assert_document_ids(&session.cache().get(&target).await.unwrap(), &[created.id.get()]);
    assert_eq!(session.panel(&target), PanelState::Loaded(1));

    // Sibling entry untouched.
    assert_eq!(session.cache().state(&other).await, EntryState::Present);
    assert_eq!(session.cache().stats().await.invalidations, 1);

    // List reset to the first page and refetched, then one tier-1 lookup.
    let queries = store.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].page, 1);
    assert_eq!(queries[0].plot_number, None);
    assert_eq!(queries[1].plot_number.as_deref(), Some("B-12"));
}

#[tokio::test]
async fn delete_invalidates_everything_and_refetches_list() {
    let (mut session, store) = open_legacy_session().await;
    store.insert(legacy_document(2, 42, 12));
    session.load_all().await;
    session.refresh_list().await.unwrap();
    assert_eq!(session.list().page().total, 2);

    session.delete_document(DocumentId::new(2)).await.unwrap();

    assert!(session.cache().present_keys().await.is_empty());
    assert_eq!(session.list().page().total, 1);
    assert_eq!(store.deletes(), vec![DocumentId::new(2)]);
}

// ============================================================================
// WORKSPACE
// ============================================================================

#[tokio::test]
async fn opening_another_property_clears_the_cache() {
    let (units, store) = legacy_property();
    let mut workspace = Workspace::new(
        Collaborators {
            documents: store,
            units,
            categories: Arc::new(MockCategorySource::new(Vec::new())),
        },
        SessionConfig::default(),
    );

    workspace.open_property(PropertyId::new(42)).await.load_all().await;
    assert_eq!(workspace.cache().present_keys().await.len(), 2);

    let session = workspace.open_property(PropertyId::new(43)).await;
    assert_eq!(session.property_id(), PropertyId::new(43));
    assert!(session.catalog().is_empty());
    assert!(workspace.cache().known_keys().await.is_empty());
}

#[tokio::test]
async fn stale_load_overwrites_new_property_entry_on_id_collision() {
    let first = PropertyId::new(1);
    let second = PropertyId::new(2);
    let units = MockUnitSources::new()
        .with_plots(first, vec![plot(5, "P1-5")])
        .with_plots(second, vec![plot(5, "P2-5")]);
    let store = Arc::new(MockDocumentStore::with_documents([
        numbered_document(10, 1, "P1-5"),
        numbered_document(20, 2, "P2-5"),
    ]));
    let gate = store.hold_queries_where(|q| q.plot_number.as_deref() == Some("P1-5"));

    let mut workspace = Workspace::new(
        Collaborators {
            documents: store.clone(),
            units: Arc::new(units),
            categories: Arc::new(MockCategorySource::new(Vec::new())),
        },
        SessionConfig::default(),
    );
    let stale = workspace.open_property(first).await.start_load();
    let in_flight = tokio::spawn(stale);
    while store.query_count() == 0 {
        tokio::task::yield_now().await;
    }

    let session = workspace.open_property(second).await;
    session.load_all().await;
    let collided = key(UnitKind::Plot, 5);
    assert_document_ids(&workspace.cache().get(&collided).await.unwrap(), &[20]);

    gate.release();
    let report = in_flight.await.unwrap();
    assert_eq!(report.associations.len(), 1);

    // Last write wins: the superseded property's result is what is cached.
    assert_document_ids(&workspace.cache().get(&collided).await.unwrap(), &[10]);
}
