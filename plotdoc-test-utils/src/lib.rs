//! Plotdoc Test Utilities
//!
//! Shared test infrastructure for the plotdoc workspace:
//! - Proptest generators for units, documents and filters
//! - Fixtures for the common property layouts
//! - Custom assertions for plotdoc results

// Re-export mock collaborators from their source crate
pub use plotdoc_storage::{MockCategorySource, MockDocumentStore, MockUnitSources};

// Re-export core types for convenience
pub use plotdoc_core::{
    Block, Category, CategoryId, Document, DocumentId, DocumentStatus, FileMetadata,
    FileUpload, FilterContext, LandPlot, LookupError, MutationError, Plot, PlotdocError,
    PlotdocResult, PropertyId, Timestamp, Unit, UnitId, UnitKey, UnitKind, UploadRequest,
    ValidationError,
};

use chrono::Utc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for plotdoc types.

    use super::*;
    use proptest::prelude::*;

    // === Identity Generators ===

    pub fn arb_property_id() -> impl Strategy<Value = PropertyId> {
        (1i64..10_000).prop_map(PropertyId::new)
    }

    pub fn arb_unit_id() -> impl Strategy<Value = UnitId> {
        (1i64..10_000).prop_map(UnitId::new)
    }

    pub fn arb_category_id() -> impl Strategy<Value = CategoryId> {
        (1i64..20).prop_map(CategoryId::new)
    }

    /// Plot number such as `A-101`.
    pub fn arb_plot_number() -> impl Strategy<Value = String> {
        "[A-Z]-[0-9]{1,4}"
    }

    /// Plot number that may be absent or blank, as on older records.
    pub fn arb_optional_plot_number() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            3 => arb_plot_number().prop_map(Some),
            1 => Just(None),
            1 => Just(Some("  ".to_string())),
        ]
    }

    // === Enum Generators ===

    pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
        prop_oneof![
            Just(UnitKind::Plot),
            Just(UnitKind::LandPlot),
            Just(UnitKind::Block),
        ]
    }

    pub fn arb_document_status() -> impl Strategy<Value = DocumentStatus> {
        prop_oneof![Just(DocumentStatus::Active), Just(DocumentStatus::Archived)]
    }

    // === Entity Generators ===

    /// Any unit variant. Blocks never carry a plot number.
    pub fn arb_unit() -> impl Strategy<Value = Unit> {
        (arb_unit_kind(), arb_unit_id(), arb_optional_plot_number()).prop_map(
            |(kind, id, plot_number)| match kind {
                UnitKind::Plot => Unit::Plot(Plot {
                    id,
                    plot_number,
                    area: None,
                    price: None,
                    status: None,
                }),
                UnitKind::LandPlot => Unit::LandPlot(LandPlot {
                    id,
                    plot_number,
                    area: None,
                    status: None,
                }),
                UnitKind::Block => Unit::Block(Block {
                    id,
                    name: None,
                    description: None,
                }),
            },
        )
    }

    /// Units with pairwise distinct keys.
    pub fn arb_distinct_units(max: usize) -> impl Strategy<Value = Vec<Unit>> {
        prop::collection::vec(arb_unit(), 0..=max).prop_map(|units| {
            let mut seen = Vec::new();
            units
                .into_iter()
                .filter(|unit| {
                    let key = unit.key();
                    if seen.contains(&key) {
                        false
                    } else {
                        seen.push(key);
                        true
                    }
                })
                .collect()
        })
    }

    /// Document of `property_id` with arbitrary unit identities.
    pub fn arb_document(property_id: PropertyId) -> impl Strategy<Value = Document> {
        (
            1i64..100_000,
            arb_optional_plot_number(),
            prop::option::of(arb_unit_id()),
            arb_category_id(),
            arb_document_status(),
            "[a-z ]{1,24}",
        )
            .prop_map(move |(id, plot_number, plot_id, category_id, status, title)| {
                let now = Utc::now();
                Document {
                    id: DocumentId::new(id),
                    property_id,
                    plot_number,
                    plot_id,
                    category_id,
                    title,
                    description: None,
                    status,
                    tags: Vec::new(),
                    file: FileMetadata::default(),
                    created_at: now,
                    updated_at: now,
                }
            })
    }

    pub fn arb_filter_context() -> impl Strategy<Value = FilterContext> {
        (
            prop::option::of(arb_category_id()),
            prop::option::of(arb_document_status()),
            prop::option::of("[a-z]{0,6}"),
        )
            .prop_map(|(category_id, status, search)| FilterContext {
                category_id,
                status,
                search,
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built units, documents and collaborators.

    use super::*;
    use std::sync::Arc;

    pub fn plot(id: i64, plot_number: Option<&str>) -> Unit {
        Unit::Plot(Plot {
            id: UnitId::new(id),
            plot_number: plot_number.map(str::to_string),
            area: None,
            price: None,
            status: None,
        })
    }

    pub fn land_plot(id: i64, plot_number: Option<&str>) -> Unit {
        Unit::LandPlot(LandPlot {
            id: UnitId::new(id),
            plot_number: plot_number.map(str::to_string),
            area: None,
            status: None,
        })
    }

    pub fn block(id: i64) -> Unit {
        Unit::Block(Block {
            id: UnitId::new(id),
            name: Some(format!("Block {id}")),
            description: None,
        })
    }

    /// Property-level document with no unit identity.
    pub fn document(id: i64, property_id: i64) -> Document {
        let now = Utc::now();
        Document {
            id: DocumentId::new(id),
            property_id: PropertyId::new(property_id),
            plot_number: None,
            plot_id: None,
            category_id: CategoryId::new(1),
            title: format!("Document {id}"),
            description: None,
            status: DocumentStatus::Active,
            tags: Vec::new(),
            file: FileMetadata {
                file_name: format!("document-{id}.pdf"),
                file_size: 1024,
                mime_type: Some("application/pdf".to_string()),
            },
            created_at: now,
            updated_at: now,
        }
    }

    /// Document linked through the business key only.
    pub fn numbered_document(id: i64, property_id: i64, plot_number: &str) -> Document {
        Document {
            plot_number: Some(plot_number.to_string()),
            ..document(id, property_id)
        }
    }

    /// Document created under the older scheme: `plot_id` set, no plot number.
    pub fn legacy_document(id: i64, property_id: i64, plot_id: i64) -> Document {
        Document {
            plot_id: Some(UnitId::new(plot_id)),
            ..document(id, property_id)
        }
    }

    pub fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            color: None,
        }
    }

    pub fn file_upload(name: &str) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4".to_vec(),
        }
    }

    /// Upload form with every required field filled in.
    pub fn upload_request(category_id: CategoryId) -> UploadRequest {
        UploadRequest {
            file: Some(file_upload("deed.pdf")),
            title: "Title deed".to_string(),
            description: None,
            category_id: Some(category_id),
            tags: vec!["deed".to_string()],
            status: DocumentStatus::Active,
        }
    }

    /// Property 42: land plot 7 (`A-101`) with one legacy document linked by
    /// id only, and land plot 12 (`B-12`) with nothing.
    pub fn legacy_property() -> (Arc<MockUnitSources>, Arc<MockDocumentStore>) {
        let property = PropertyId::new(42);
        let units = MockUnitSources::new().with_land_plots(
            property,
            vec![
                LandPlot {
                    id: UnitId::new(7),
                    plot_number: Some("A-101".to_string()),
                    area: None,
                    status: None,
                },
                LandPlot {
                    id: UnitId::new(12),
                    plot_number: Some("B-12".to_string()),
                    area: None,
                    status: None,
                },
            ],
        );
        let documents = MockDocumentStore::with_documents([legacy_document(1, 42, 7)]);
        (Arc::new(units), Arc::new(documents))
    }

    pub fn standard_categories() -> Vec<Category> {
        vec![category(1, "Deeds"), category(2, "Permits"), category(3, "Plans")]
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for plotdoc results.

    use super::*;

    /// Assert that a PlotdocResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &PlotdocResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a PlotdocResult is a validation error naming `field`.
    #[track_caller]
    pub fn assert_missing_field<T: std::fmt::Debug>(result: &PlotdocResult<T>, field: &str) {
        match result {
            Err(PlotdocError::Validation(ValidationError::RequiredFieldMissing { field: f })) => {
                assert_eq!(f, field, "Wrong field in validation error");
            }
            other => panic!("Expected missing {} error, got: {:?}", field, other),
        }
    }

    /// Assert that a PlotdocResult is any validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &PlotdocResult<T>) {
        match result {
            Err(PlotdocError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a PlotdocResult is a mutation error.
    #[track_caller]
    pub fn assert_mutation_error<T: std::fmt::Debug>(result: &PlotdocResult<T>) {
        match result {
            Err(PlotdocError::Mutation(_)) => {}
            other => panic!("Expected Mutation error, got: {:?}", other),
        }
    }

    /// Assert that `documents` contains exactly the ids in `expected`, in
    /// any order.
    #[track_caller]
    pub fn assert_document_ids(documents: &[Document], expected: &[i64]) {
        let mut actual: Vec<i64> = documents.iter().map(|d| d.id.get()).collect();
        let mut expected = expected.to_vec();
        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(actual, expected, "Unexpected document set");
    }
}

// ============================================================================
// TESTS
// ============================================================================
