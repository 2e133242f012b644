//! Core entity structures

use crate::{CategoryId, DocumentId, DocumentStatus, PropertyId, Timestamp, UnitId, UnitKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A listed property. Owned by the listings service and read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Regular plot of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub id: UnitId,
    /// Business key. Absent on records created before plot numbering existed.
    #[serde(default)]
    pub plot_number: Option<String>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Land plot of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandPlot {
    pub id: UnitId,
    #[serde(default)]
    pub plot_number: Option<String>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Block configuration of a property. Blocks are only addressable by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: UnitId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A subordinate unit of a property, tagged with its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unit {
    Plot(Plot),
    LandPlot(LandPlot),
    Block(Block),
}

impl Unit {
    pub fn id(&self) -> UnitId {
        match self {
            Unit::Plot(p) => p.id,
            Unit::LandPlot(p) => p.id,
            Unit::Block(b) => b.id,
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Plot(_) => UnitKind::Plot,
            Unit::LandPlot(_) => UnitKind::LandPlot,
            Unit::Block(_) => UnitKind::Block,
        }
    }

    pub fn key(&self) -> UnitKey {
        UnitKey::new(self.kind(), self.id())
    }

    /// The business key, if present and not blank.
    pub fn plot_number(&self) -> Option<&str> {
        let raw = match self {
            Unit::Plot(p) => p.plot_number.as_deref(),
            Unit::LandPlot(p) => p.plot_number.as_deref(),
            Unit::Block(_) => None,
        };
        raw.map(str::trim).filter(|s| !s.is_empty())
    }

    /// Human-facing label: plot number, block name, or `kind #id`.
    pub fn label(&self) -> String {
        if let Some(number) = self.plot_number() {
            return number.to_string();
        }
        if let Unit::Block(Block { name: Some(name), .. }) = self {
            if !name.trim().is_empty() {
                return name.clone();
            }
        }
        format!("{} #{}", self.kind(), self.id())
    }
}

impl From<Plot> for Unit {
    fn from(plot: Plot) -> Self {
        Unit::Plot(plot)
    }
}

impl From<LandPlot> for Unit {
    fn from(plot: LandPlot) -> Self {
        Unit::LandPlot(plot)
    }
}

impl From<Block> for Unit {
    fn from(block: Block) -> Self {
        Unit::Block(block)
    }
}

/// Cache and report key for a unit. Numeric ids are only unique per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub kind: UnitKind,
    pub id: UnitId,
}

impl UnitKey {
    pub const fn new(kind: UnitKind, id: UnitId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Stored file attributes of a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// A document attached to a property and, optionally, to one of its units.
///
/// `plot_number` is the preferred unit identity and `plot_id` the legacy one.
/// Either, both or neither may be set, and they are not guaranteed to agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub property_id: PropertyId,
    #[serde(default)]
    pub plot_number: Option<String>,
    #[serde(default)]
    pub plot_id: Option<UnitId>,
    pub category_id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub file: FileMetadata,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    /// Whether the business key of this document names `plot_number`.
    pub fn matches_plot_number(&self, plot_number: &str) -> bool {
        self.plot_number.as_deref().map(str::trim) == Some(plot_number.trim())
    }
}

/// Document category as listed by the category endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land_plot(id: i64, number: Option<&str>) -> Unit {
        Unit::LandPlot(LandPlot {
            id: UnitId::new(id),
            plot_number: number.map(str::to_string),
            area: None,
            status: None,
        })
    }

    #[test]
    fn test_blank_plot_number_is_absent() {
        assert_eq!(land_plot(1, Some("   ")).plot_number(), None);
        assert_eq!(land_plot(1, Some(" A-101 ")).plot_number(), Some("A-101"));
        assert_eq!(land_plot(1, None).plot_number(), None);
    }

    #[test]
    fn test_unit_key_distinguishes_kinds() {
        let block = Unit::Block(Block {
            id: UnitId::new(7),
            name: None,
            description: None,
        });
        let plot = land_plot(7, None);
        assert_eq!(block.id(), plot.id());
        assert_ne!(block.key(), plot.key());
    }

    #[test]
    fn test_unit_label_fallbacks() {
        assert_eq!(land_plot(3, Some("B-12")).label(), "B-12");
        assert_eq!(land_plot(3, None).label(), "land_plot #3");
        let block = Unit::Block(Block {
            id: UnitId::new(9),
            name: Some("Tower A".to_string()),
            description: None,
        });
        assert_eq!(block.label(), "Tower A");
    }

    #[test]
    fn test_unit_serializes_with_kind_tag() {
        let json = serde_json::to_value(land_plot(7, Some("A-101"))).unwrap();
        assert_eq!(json["kind"], "land_plot");
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_document_decodes_flat_file_fields() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "id": 1,
            "property_id": 42,
            "plot_id": 7,
            "category_id": 3,
            "title": "Deed",
            "status": "archived",
            "file_name": "deed.pdf",
            "file_size": 1024,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(doc.plot_id, Some(UnitId::new(7)));
        assert_eq!(doc.plot_number, None);
        assert_eq!(doc.status, DocumentStatus::Archived);
        assert_eq!(doc.file.file_name, "deed.pdf");
        assert!(doc.tags.is_empty());
    }
}
