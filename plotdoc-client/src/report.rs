//! Per-unit association report.

use plotdoc_core::{Unit, UnitKey};
use plotdoc_resolve::{LoadReport, PanelState, UnitCatalog};
use std::fmt;

/// One report line: `kind id plot_number state count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub key: UnitKey,
    pub plot_number: Option<String>,
    pub state: PanelState,
    pub count: usize,
}

impl ReportLine {
    pub fn new(unit: &Unit, report: &LoadReport) -> Self {
        let key = unit.key();
        let count = report.total(&key).unwrap_or(0);
        let state = match report.outcome(&key) {
            Some(outcome) => PanelState::settled(outcome, count),
            None => PanelState::Collapsed,
        };
        Self {
            key,
            plot_number: unit.plot_number().map(str::to_string),
            state,
            count,
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.key.kind,
            self.key.id,
            self.plot_number.as_deref().unwrap_or("-"),
            self.state,
            self.count
        )
    }
}

/// Report lines for every catalog unit, in catalog order.
pub fn lines(catalog: &UnitCatalog, report: &LoadReport) -> Vec<ReportLine> {
    catalog
        .units()
        .iter()
        .map(|unit| ReportLine::new(unit, report))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotdoc_core::ResolutionOutcome;
    use plotdoc_test_utils::fixtures::{block, land_plot, legacy_document};

    #[test]
    fn test_line_format() {
        let numbered = land_plot(7, Some("A-101"));
        let unnumbered = block(3);
        let mut report = LoadReport::default();
        report
            .associations
            .insert(numbered.key(), vec![legacy_document(1, 42, 7)]);
        report.totals.insert(numbered.key(), 1);
        report.outcomes.insert(numbered.key(), ResolutionOutcome::Matched);
        report.associations.insert(unnumbered.key(), Vec::new());
        report.totals.insert(unnumbered.key(), 0);
        report
            .outcomes
            .insert(unnumbered.key(), ResolutionOutcome::Failed);

        assert_eq!(
            ReportLine::new(&numbered, &report).to_string(),
            "land_plot 7 A-101 loaded 1"
        );
        assert_eq!(
            ReportLine::new(&unnumbered, &report).to_string(),
            "block 3 - error 0"
        );
    }

    #[test]
    fn test_count_is_total_not_fetched_page() {
        let unit = land_plot(7, Some("A-101"));
        let mut report = LoadReport::default();
        report
            .associations
            .insert(unit.key(), vec![legacy_document(1, 42, 7)]);
        report.totals.insert(unit.key(), 150);
        report.outcomes.insert(unit.key(), ResolutionOutcome::Matched);

        let line = ReportLine::new(&unit, &report);
        assert_eq!(line.state, PanelState::Loaded(150));
        assert_eq!(line.to_string(), "land_plot 7 A-101 loaded 150");
    }
}
