//! Per-unit document panel state.

use std::collections::HashMap;
use std::fmt;

use plotdoc_core::{ResolutionOutcome, UnitKey};
use plotdoc_storage::CachedAssociation;

/// What a unit's document panel currently shows.
///
/// `Empty` (the unit confirmedly has no documents) and `Error` (its lookups
/// failed) are distinct states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Collapsed,
    Loading,
    Loaded(usize),
    Empty,
    Error(String),
}

impl PanelState {
    /// Settled state for a complete cache entry.
    pub fn from_association(association: &CachedAssociation) -> Self {
        Self::settled(association.outcome, association.total)
    }

    pub fn settled(outcome: ResolutionOutcome, count: usize) -> Self {
        match outcome {
            ResolutionOutcome::Failed => {
                PanelState::Error("documents could not be loaded".to_string())
            }
            ResolutionOutcome::ConfirmedEmpty => PanelState::Empty,
            ResolutionOutcome::Matched | ResolutionOutcome::Degraded if count == 0 => {
                PanelState::Empty
            }
            ResolutionOutcome::Matched | ResolutionOutcome::Degraded => PanelState::Loaded(count),
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            PanelState::Loaded(_) | PanelState::Empty | PanelState::Error(_)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PanelState::Collapsed => "collapsed",
            PanelState::Loading => "loading",
            PanelState::Loaded(_) => "loaded",
            PanelState::Empty => "empty",
            PanelState::Error(_) => "error",
        }
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Panel states of every unit, with the transition history of each.
#[derive(Debug, Clone, Default)]
pub struct PanelBoard {
    states: HashMap<UnitKey, PanelState>,
    history: HashMap<UnitKey, Vec<PanelState>>,
}

impl PanelBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &UnitKey) -> PanelState {
        self.states.get(key).cloned().unwrap_or_default()
    }

    /// States `key` has moved through, oldest first, excluding the initial
    /// `Collapsed`.
    pub fn history(&self, key: &UnitKey) -> &[PanelState] {
        self.history.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn transition(&mut self, key: UnitKey, state: PanelState) {
        if self.states.get(&key) == Some(&state) {
            return;
        }
        self.history.entry(key).or_default().push(state.clone());
        self.states.insert(key, state);
    }

    pub fn collapse(&mut self, key: UnitKey) {
        self.transition(key, PanelState::Collapsed);
    }

    /// Collapse every panel and forget the history.
    pub fn reset(&mut self) {
        self.states.clear();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotdoc_core::{UnitId, UnitKind};

    #[test]
    fn test_empty_and_error_are_distinct() {
        let empty = PanelState::settled(ResolutionOutcome::ConfirmedEmpty, 0);
        let error = PanelState::settled(ResolutionOutcome::Failed, 0);
        assert_eq!(empty, PanelState::Empty);
        assert!(matches!(error, PanelState::Error(_)));
        assert_ne!(empty, error);
    }

    #[test]
    fn test_degraded_maps_by_count() {
        assert_eq!(
            PanelState::settled(ResolutionOutcome::Degraded, 3),
            PanelState::Loaded(3)
        );
        assert_eq!(
            PanelState::settled(ResolutionOutcome::Degraded, 0),
            PanelState::Empty
        );
    }

    #[test]
    fn test_board_records_transitions() {
        let key = UnitKey::new(UnitKind::Block, UnitId::new(1));
        let mut board = PanelBoard::new();
        assert_eq!(board.state(&key), PanelState::Collapsed);

        board.transition(key, PanelState::Loading);
        board.transition(key, PanelState::Loaded(2));
        board.transition(key, PanelState::Loaded(2));
        board.collapse(key);

        assert_eq!(
            board.history(&key),
            &[PanelState::Loading, PanelState::Loaded(2), PanelState::Collapsed]
        );
    }
}
