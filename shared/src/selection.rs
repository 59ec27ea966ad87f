use crate::registry::{GeoRegistry, RegionId};

/// Which drill-down level the map is at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<'a> {
    Overview,
    RegionFocused(&'a str),
}

/// The selected and hovered regions.
///
/// `hovered` is only ever set while nothing is selected: once a region is
/// focused, features stop reacting to hover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<RegionId>,
    hovered: Option<RegionId>,
}

impl SelectionState {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn phase(&self) -> Phase<'_> {
        match self.selected.as_deref() {
            Some(id) => Phase::RegionFocused(id),
            None => Phase::Overview,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.selected.is_some()
    }

    /// Focus `id`. Unknown ids and re-selecting the current region are
    /// no-ops. Returns whether the selection changed.
    pub fn select(&mut self, id: &str, registry: &GeoRegistry) -> bool {
        if registry.region(id).is_none() {
            tracing::debug!(region = %id, "ignoring selection of unknown region");
            return false;
        }
        if self.selected.as_deref() == Some(id) {
            return false;
        }
        self.selected = Some(id.to_string());
        self.hovered = None;
        true
    }

    /// Return to the overview, clearing hover as well.
    pub fn back(&mut self) -> bool {
        let changed = self.selected.is_some() || self.hovered.is_some();
        self.selected = None;
        self.hovered = None;
        changed
    }

    /// Only legal in the overview; ignored while a region is focused.
    pub fn hover(&mut self, id: &str) -> bool {
        if self.selected.is_some() || self.hovered.as_deref() == Some(id) {
            return false;
        }
        self.hovered = Some(id.to_string());
        true
    }

    /// Clears hover only if `id` is the hovered region.
    pub fn unhover(&mut self, id: &str) -> bool {
        if self.hovered.as_deref() != Some(id) {
            return false;
        }
        self.hovered = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_support::two_region_registry;

    #[test]
    fn starts_in_overview() {
        let state = SelectionState::default();
        assert_eq!(state.phase(), Phase::Overview);
        assert_eq!(state.hovered(), None);
    }

    #[test]
    fn select_known_region_focuses_and_clears_hover() {
        let registry = two_region_registry();
        let mut state = SelectionState::default();
        assert!(state.hover("B"));
        assert!(state.select("A", &registry));
        assert_eq!(state.phase(), Phase::RegionFocused("A"));
        assert_eq!(state.hovered(), None);
    }

    #[test]
    fn unknown_region_is_a_no_op() {
        let registry = two_region_registry();
        let mut state = SelectionState::default();
        state.hover("A");
        let before = state.clone();
        assert!(!state.select("atlantis", &registry));
        assert_eq!(state, before);
    }

    #[test]
    fn select_then_back_is_identity_for_every_region() {
        let registry = two_region_registry();
        for region in registry.regions() {
            let mut state = SelectionState::default();
            state.select(&region.id, &registry);
            state.back();
            assert_eq!(state, SelectionState::default(), "region {}", region.id);
        }
    }

    #[test]
    fn hover_ignored_while_focused() {
        let registry = two_region_registry();
        let mut state = SelectionState::default();
        state.select("A", &registry);
        for region in registry.regions() {
            assert!(!state.hover(&region.id));
            assert_eq!(state.hovered(), None);
        }
    }

    #[test]
    fn unhover_only_clears_matching_region() {
        let mut state = SelectionState::default();
        state.hover("A");
        assert!(!state.unhover("B"));
        assert_eq!(state.hovered(), Some("A"));
        assert!(state.unhover("A"));
        assert_eq!(state.hovered(), None);
    }

    #[test]
    fn back_from_overview_reports_no_change() {
        let mut state = SelectionState::default();
        assert!(!state.back());
        state.hover("A");
        assert!(state.back());
        assert_eq!(state.hovered(), None);
    }
}
