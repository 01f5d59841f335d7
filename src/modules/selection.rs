// Checkbox selection: tabs marked for bulk close.
// Independent of drag selection and survives drags.

use std::collections::HashSet;

use crate::state::TabId;

/// Keep only ids that still exist, preserving the order of `selected`.
pub fn sync_selected_tabs_with_existing(selected: &[TabId], existing: &[TabId]) -> Vec<TabId> {
    let existing: HashSet<TabId> = existing.iter().copied().collect();
    let mut seen = HashSet::new();
    selected
        .iter()
        .copied()
        .filter(|id| existing.contains(id) && seen.insert(*id))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabSelection {
    // Insertion order matters for pruning; lookups are on small sets.
    selected_tab_ids: Vec<TabId>,
}

impl TabSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[TabId] {
        &self.selected_tab_ids
    }

    pub fn len(&self) -> usize {
        self.selected_tab_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_tab_ids.is_empty()
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.selected_tab_ids.contains(&tab_id)
    }

    pub fn select(&mut self, tab_id: TabId) {
        if !self.contains(tab_id) {
            self.selected_tab_ids.push(tab_id);
        }
    }

    pub fn deselect(&mut self, tab_id: TabId) {
        self.selected_tab_ids.retain(|id| *id != tab_id);
    }

    /// Returns whether the tab is selected afterwards.
    pub fn toggle(&mut self, tab_id: TabId) -> bool {
        if self.contains(tab_id) {
            self.deselect(tab_id);
            false
        } else {
            self.select(tab_id);
            true
        }
    }

    pub fn select_all(&mut self, tab_ids: impl IntoIterator<Item = TabId>) {
        for id in tab_ids {
            self.select(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected_tab_ids.clear();
    }

    pub fn sync_with_existing_tabs(&mut self, existing: &[TabId]) {
        self.selected_tab_ids = sync_selected_tabs_with_existing(&self.selected_tab_ids, existing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[3, 1, 2], &[1, 2, 3], &[3, 1, 2])]
    #[case(&[3, 1, 2], &[2, 3], &[3, 2])]
    #[case(&[5, 6], &[1, 2], &[])]
    #[case(&[], &[1, 2], &[])]
    #[case(&[4, 4, 1], &[1, 4], &[4, 1])]
    fn test_sync_selected_tabs(#[case] selected: &[TabId], #[case] existing: &[TabId], #[case] expected: &[TabId]) {
        assert_eq!(sync_selected_tabs_with_existing(selected, existing), expected);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let selected = [9, 2, 7, 4];
        let existing = [4, 7, 1, 2];
        let once = sync_selected_tabs_with_existing(&selected, &existing);
        let twice = sync_selected_tabs_with_existing(&once, &existing);
        assert_eq!(once, twice);
        assert!(once.iter().all(|id| existing.contains(id) && selected.contains(id)));
    }

    #[test]
    fn test_toggle_and_prune() {
        let mut selection = TabSelection::new();
        assert!(selection.toggle(1));
        assert!(selection.toggle(2));
        assert!(selection.toggle(3));
        assert!(!selection.toggle(2));
        assert_eq!(selection.ids(), &[1, 3]);

        selection.sync_with_existing_tabs(&[3, 8]);
        assert_eq!(selection.ids(), &[3]);
    }
}
