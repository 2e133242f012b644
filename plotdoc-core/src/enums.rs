//! Enum types for units and documents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CORE ENUMS
// ============================================================================

/// Variant tag of a subordinate unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Plot,
    LandPlot,
    Block,
}

impl UnitKind {
    /// Wire tag sent as `plot_type` when a document is created for this kind.
    pub fn plot_type(self) -> PlotType {
        match self {
            UnitKind::Plot => PlotType::Plot,
            UnitKind::LandPlot => PlotType::LandPlot,
            UnitKind::Block => PlotType::PropertyBlock,
        }
    }

    /// Whether units of this kind can carry a `plot_number` business key.
    pub fn carries_plot_number(self) -> bool {
        !matches!(self, UnitKind::Block)
    }
}

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Active,
    Archived,
}

/// Informational unit type attached to a created document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotType {
    Plot,
    LandPlot,
    PropertyBlock,
}

impl PlotType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlotType::Plot => "plot",
            PlotType::LandPlot => "land_plot",
            PlotType::PropertyBlock => "property_block",
        }
    }
}

/// How a unit's document set was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// A tier returned at least one document for what was asked.
    Matched,
    /// Every tier that ran answered, and none had documents.
    ConfirmedEmpty,
    /// A unit tier failed; the property-wide fallback answered instead.
    Degraded,
    /// No tier produced an answer.
    Failed,
}

impl ResolutionOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, ResolutionOutcome::Failed)
    }
}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            UnitKind::Plot => "plot",
            UnitKind::LandPlot => "land_plot",
            UnitKind::Block => "block",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for UnitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "plot" => Ok(UnitKind::Plot),
            "landplot" => Ok(UnitKind::LandPlot),
            "block" | "propertyblock" => Ok(UnitKind::Block),
            _ => Err(format!("Invalid UnitKind: {}", s)),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DocumentStatus::Active => "active",
            DocumentStatus::Archived => "archived",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "active" => Ok(DocumentStatus::Active),
            "archived" | "archive" => Ok(DocumentStatus::Archived),
            _ => Err(format!("Invalid DocumentStatus: {}", s)),
        }
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ResolutionOutcome::Matched => "matched",
            ResolutionOutcome::ConfirmedEmpty => "confirmed_empty",
            ResolutionOutcome::Degraded => "degraded",
            ResolutionOutcome::Failed => "failed",
        };
        write!(f, "{}", value)
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_kind_plot_type_mapping() {
        assert_eq!(UnitKind::Plot.plot_type(), PlotType::Plot);
        assert_eq!(UnitKind::LandPlot.plot_type(), PlotType::LandPlot);
        assert_eq!(UnitKind::Block.plot_type(), PlotType::PropertyBlock);
    }

    #[test]
    fn test_plot_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PlotType::PropertyBlock).unwrap(),
            "\"property_block\""
        );
        assert_eq!(PlotType::LandPlot.to_string(), "land_plot");
    }

    #[test]
    fn test_unit_kind_from_str_accepts_variants() {
        assert_eq!("land-plot".parse::<UnitKind>(), Ok(UnitKind::LandPlot));
        assert_eq!("Property Block".parse::<UnitKind>(), Ok(UnitKind::Block));
        assert!("parcel".parse::<UnitKind>().is_err());
    }

    #[test]
    fn test_document_status_round_trip_text() {
        for status in [DocumentStatus::Active, DocumentStatus::Archived] {
            assert_eq!(status.to_string().parse::<DocumentStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_only_blocks_lack_plot_numbers() {
        assert!(UnitKind::Plot.carries_plot_number());
        assert!(UnitKind::LandPlot.carries_plot_number());
        assert!(!UnitKind::Block.carries_plot_number());
    }
}
