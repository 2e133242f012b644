//! Unit catalog of one property.
//!
//! The three unit listings are requested concurrently and independently. A
//! listing that fails is replaced by an empty list and remembered as
//! degraded; the catalog itself always loads.

use futures_util::future::join3;
use plotdoc_core::{Block, LandPlot, LookupError, Plot, PropertyId, Unit, UnitKey, UnitKind};
use plotdoc_storage::UnitSources;

/// All subordinate units of a property, merged from the three listings.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCatalog {
    property_id: PropertyId,
    plots: Vec<Plot>,
    land_plots: Vec<LandPlot>,
    blocks: Vec<Block>,
    degraded: Vec<UnitKind>,
}

impl UnitCatalog {
    /// Empty catalog, as if every listing returned nothing.
    pub fn empty(property_id: PropertyId) -> Self {
        Self {
            property_id,
            plots: Vec::new(),
            land_plots: Vec::new(),
            blocks: Vec::new(),
            degraded: Vec::new(),
        }
    }

    /// Load every listing for `property_id`, degrading failed ones to empty.
    pub async fn load(sources: &dyn UnitSources, property_id: PropertyId) -> Self {
        let (plots, land_plots, blocks) = join3(
            sources.plots(property_id),
            sources.land_plots(property_id),
            sources.blocks(property_id),
        )
        .await;

        let mut catalog = Self::empty(property_id);
        catalog.plots = catalog.degrade(UnitKind::Plot, plots);
        catalog.land_plots = catalog.degrade(UnitKind::LandPlot, land_plots);
        catalog.blocks = catalog.degrade(UnitKind::Block, blocks);

        tracing::debug!(
            property_id = %property_id,
            plots = catalog.plots.len(),
            land_plots = catalog.land_plots.len(),
            blocks = catalog.blocks.len(),
            degraded = ?catalog.degraded,
            "Unit catalog loaded"
        );
        catalog
    }

    fn degrade<T>(&mut self, kind: UnitKind, result: Result<Vec<T>, LookupError>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    property_id = %self.property_id,
                    source = %kind,
                    error = %e,
                    "Unit source failed, treating as empty"
                );
                self.degraded.push(kind);
                Vec::new()
            }
        }
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn land_plots(&self) -> &[LandPlot] {
        &self.land_plots
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Listings that failed during load.
    pub fn degraded_sources(&self) -> &[UnitKind] {
        &self.degraded
    }

    /// Every unit, tagged with its variant: plots, then land plots, then blocks.
    pub fn units(&self) -> Vec<Unit> {
        self.plots
            .iter()
            .cloned()
            .map(Unit::from)
            .chain(self.land_plots.iter().cloned().map(Unit::from))
            .chain(self.blocks.iter().cloned().map(Unit::from))
            .collect()
    }

    pub fn find(&self, key: UnitKey) -> Option<Unit> {
        match key.kind {
            UnitKind::Plot => self
                .plots
                .iter()
                .find(|p| p.id == key.id)
                .cloned()
                .map(Unit::from),
            UnitKind::LandPlot => self
                .land_plots
                .iter()
                .find(|p| p.id == key.id)
                .cloned()
                .map(Unit::from),
            UnitKind::Block => self
                .blocks
                .iter()
                .find(|b| b.id == key.id)
                .cloned()
                .map(Unit::from),
        }
    }

    pub fn len(&self) -> usize {
        self.plots.len() + self.land_plots.len() + self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotdoc_core::UnitId;
    use plotdoc_storage::MockUnitSources;

    fn plot(id: i64, number: &str) -> Plot {
        Plot {
            id: UnitId::new(id),
            plot_number: Some(number.to_string()),
            area: None,
            price: None,
            status: None,
        }
    }

    fn block(id: i64) -> Block {
        Block {
            id: UnitId::new(id),
            name: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_load_merges_all_sources() {
        let property = PropertyId::new(42);
        let sources = MockUnitSources::new()
            .with_plots(property, vec![plot(1, "P-1"), plot(2, "P-2")])
            .with_land_plots(
                property,
                vec![LandPlot {
                    id: UnitId::new(7),
                    plot_number: Some("A-101".to_string()),
                    area: None,
                    status: None,
                }],
            )
            .with_blocks(property, vec![block(1)]);

        let catalog = UnitCatalog::load(&sources, property).await;
        assert_eq!(catalog.len(), 4);
        assert!(catalog.degraded_sources().is_empty());

        let kinds: Vec<UnitKind> = catalog.units().iter().map(Unit::kind).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::Plot,
                UnitKind::Plot,
                UnitKind::LandPlot,
                UnitKind::Block
            ]
        );
        assert_eq!(sources.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_source_degrades_to_empty() {
        let property = PropertyId::new(42);
        let sources = MockUnitSources::new()
            .with_plots(property, vec![plot(1, "P-1")])
            .fail_land_plots(property, LookupError::transport("timeout"))
            .with_blocks(property, vec![block(3)]);

        let catalog = UnitCatalog::load(&sources, property).await;
        assert_eq!(catalog.len(), 2);
        assert!(catalog.land_plots().is_empty());
        assert_eq!(catalog.degraded_sources(), &[UnitKind::LandPlot]);
    }

    #[tokio::test]
    async fn test_total_failure_yields_empty_catalog() {
        let property = PropertyId::new(5);
        let err = LookupError::transport("down");
        let sources = MockUnitSources::new()
            .fail_plots(property, err.clone())
            .fail_land_plots(property, err.clone())
            .fail_blocks(property, err);

        let catalog = UnitCatalog::load(&sources, property).await;
        assert!(catalog.is_empty());
        assert_eq!(catalog.degraded_sources().len(), 3);
    }

    #[tokio::test]
    async fn test_find_respects_kind() {
        let property = PropertyId::new(1);
        let sources = MockUnitSources::new()
            .with_plots(property, vec![plot(9, "P-9")])
            .with_blocks(property, vec![block(9)]);
        let catalog = UnitCatalog::load(&sources, property).await;

        let found = catalog
            .find(UnitKey::new(UnitKind::Block, UnitId::new(9)))
            .unwrap();
        assert_eq!(found.kind(), UnitKind::Block);
        assert!(catalog
            .find(UnitKey::new(UnitKind::LandPlot, UnitId::new(9)))
            .is_none());
    }
}
