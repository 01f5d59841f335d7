//! Drag selection: the tabs that move together when one of them is dragged.
//!
//! The selection is scoped to a single window. Adding a tab from another
//! window replaces the whole selection rather than merging into it.

use std::collections::HashSet;

use crate::modules::range::range_for_window;
use crate::state::{Tab, TabId, WindowId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSelection {
    selected_ids: HashSet<TabId>,
    window_id: Option<WindowId>,
    /// Last single selection, used as the shift-click anchor.
    anchor_id: Option<TabId>,
}

impl DragSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_ids(&self) -> &HashSet<TabId> {
        &self.selected_ids
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window_id
    }

    pub fn anchor_id(&self) -> Option<TabId> {
        self.anchor_id
    }

    /// Position of the anchor in `ordered_tabs`, resolved by id so a refresh
    /// between clicks cannot point it at another tab.
    pub fn last_selected_index(&self, ordered_tabs: &[Tab]) -> Option<usize> {
        let anchor_id = self.anchor_id?;
        ordered_tabs.iter().position(|t| t.id == Some(anchor_id))
    }

    pub fn len(&self) -> usize {
        self.selected_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_ids.is_empty()
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.selected_ids.contains(&tab_id)
    }

    /// Scope the selection to `window_id`, dropping ids from any other window.
    fn scope_to(&mut self, window_id: WindowId) {
        if self.window_id != Some(window_id) {
            if !self.selected_ids.is_empty() {
                log::debug!(
                    "[DragSelection] Window changed {:?} -> {}, dropping {} ids",
                    self.window_id,
                    window_id,
                    self.selected_ids.len()
                );
            }
            self.selected_ids.clear();
            self.anchor_id = None;
            self.window_id = Some(window_id);
        }
    }

    pub fn add_tab(&mut self, tab_id: TabId, window_id: WindowId) {
        self.scope_to(window_id);
        self.selected_ids.insert(tab_id);
        self.anchor_id = Some(tab_id);
    }

    pub fn add_tabs(&mut self, tab_ids: impl IntoIterator<Item = TabId>, window_id: WindowId) {
        self.scope_to(window_id);
        self.selected_ids.extend(tab_ids);
        if self.selected_ids.is_empty() {
            self.window_id = None;
        }
    }

    /// Never changes the window, even when the last id goes.
    pub fn remove_tab(&mut self, tab_id: TabId) {
        self.selected_ids.remove(&tab_id);
    }

    /// cmd/ctrl-click: flip one tab in or out of the selection.
    pub fn toggle_tab(&mut self, tab_id: TabId, window_id: WindowId) -> bool {
        if self.window_id == Some(window_id) && self.contains(tab_id) {
            self.remove_tab(tab_id);
            false
        } else {
            self.add_tab(tab_id, window_id);
            true
        }
    }

    /// shift-click at `position` in the display order. The first click (or a
    /// click in another window) only sets the anchor; later clicks select the
    /// anchor..position range within the anchor's window.
    pub fn extend_to(&mut self, ordered_tabs: &[Tab], position: usize) {
        let Some(tab) = ordered_tabs.get(position) else {
            return;
        };
        let Some(tab_id) = tab.id else {
            return;
        };

        let anchor = self
            .last_selected_index(ordered_tabs)
            .filter(|&i| Some(ordered_tabs[i].window_id) == self.window_id);
        match (anchor, self.window_id) {
            (Some(anchor), Some(window_id)) if window_id == tab.window_id => {
                let ids = range_for_window(ordered_tabs, anchor, position, window_id);
                self.add_tabs(ids, window_id);
            }
            _ => self.add_tab(tab_id, tab.window_id),
        }
    }

    pub fn clear(&mut self) {
        self.selected_ids.clear();
        self.window_id = None;
        self.anchor_id = None;
    }

    /// Selected ids that exist in `window_tabs`, in index order.
    pub fn ordered_in(&self, window_tabs: &[Tab]) -> Vec<TabId> {
        let mut tabs: Vec<&Tab> = window_tabs
            .iter()
            .filter(|t| t.id.is_some_and(|id| self.contains(id)))
            .collect();
        tabs.sort_by_key(|t| t.index);
        tabs.into_iter().filter_map(|t| t.id).collect()
    }
}
