//! Plotdoc Core - Entity Types
//!
//! Pure data structures shared by every other crate: identities, the
//! property/unit/document model, query and mutation payloads, and the error
//! taxonomy. This crate performs no I/O.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod payload;
pub mod query;

pub use entities::{
    Block, Category, Document, FileMetadata, LandPlot, Plot, Property, Unit, UnitKey,
};
pub use enums::{DocumentStatus, PlotType, ResolutionOutcome, UnitKind};
pub use error::{LookupError, MutationError, PlotdocError, PlotdocResult, ValidationError};
pub use identity::{CategoryId, DocumentId, PropertyId, Timestamp, UnitId};
pub use payload::{DocumentCreate, DocumentPatch, FileUpload, UploadRequest, ValidatedUpload};
pub use query::{DocumentPage, DocumentQuery, FilterContext, ListCursor, FIRST_PAGE};
