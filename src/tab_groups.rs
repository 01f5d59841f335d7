// Latest-known grouping of tabs by window.
// Replaced wholesale on every refresh; nothing patches it incrementally.

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::state::{Tab, TabId, WindowGroup, WindowId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabSnapshot {
    pub groups: Vec<WindowGroup>,
    pub revision: u64,
}

impl TabSnapshot {
    pub fn find_tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.groups
            .iter()
            .flat_map(|g| g.tabs.iter())
            .find(|t| t.id == Some(tab_id))
    }

    pub fn window(&self, window_id: WindowId) -> Option<&WindowGroup> {
        self.groups.iter().find(|g| g.window_id == window_id)
    }

    pub fn window_tabs(&self, window_id: WindowId) -> &[Tab] {
        self.window(window_id).map(|g| g.tabs.as_slice()).unwrap_or(&[])
    }

    /// All tabs in display order: windows in group order, tabs by index.
    pub fn ordered_tabs(&self) -> Vec<Tab> {
        self.groups.iter().flat_map(|g| g.tabs.iter().cloned()).collect()
    }

    pub fn all_tab_ids(&self) -> Vec<TabId> {
        self.groups.iter().flat_map(|g| g.tab_ids()).collect()
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.groups.iter().map(|g| g.window_id).collect()
    }
}

/// Group a flat tab list by window. Windows keep the order in which they first
/// appear; `active_window` (if present) is moved to the front.
pub fn group_tabs(tabs: &[Tab], active_window: Option<WindowId>) -> Vec<WindowGroup> {
    let mut groups: Vec<WindowGroup> = Vec::new();
    for tab in tabs {
        match groups.iter_mut().find(|g| g.window_id == tab.window_id) {
            Some(group) => group.tabs.push(tab.clone()),
            None => groups.push(WindowGroup {
                window_id: tab.window_id,
                tabs: vec![tab.clone()],
                window_group_number: 0,
            }),
        }
    }

    for group in &mut groups {
        group.tabs.sort_by_key(|t| t.index);
    }

    if let Some(active) = active_window {
        if let Some(pos) = groups.iter().position(|g| g.window_id == active) {
            let group = groups.remove(pos);
            groups.insert(0, group);
        }
    }

    for (i, group) in groups.iter_mut().enumerate() {
        group.window_group_number = i + 1;
    }
    groups
}

pub struct TabGroupStore {
    current: ArcSwap<TabSnapshot>,
    revision: AtomicU64,
    active_window: ArcSwap<Option<WindowId>>,
    active_window_first: bool,
}

impl TabGroupStore {
    pub fn new(active_window_first: bool) -> Self {
        Self {
            current: ArcSwap::from_pointee(TabSnapshot::default()),
            revision: AtomicU64::new(0),
            active_window: ArcSwap::from_pointee(None),
            active_window_first,
        }
    }

    /// Always the latest snapshot. Callers must not hold on to it across a refresh
    /// when they need positions; re-read instead.
    pub fn snapshot(&self) -> Arc<TabSnapshot> {
        self.current.load_full()
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn replace_all(&self, tabs: &[Tab]) -> Arc<TabSnapshot> {
        let active = if self.active_window_first {
            **self.active_window.load()
        } else {
            None
        };
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = Arc::new(TabSnapshot {
            groups: group_tabs(tabs, active),
            revision,
        });
        log::debug!(
            "[TabGroups] Snapshot r{}: {} tabs in {} windows",
            revision,
            tabs.len(),
            snapshot.groups.len()
        );
        self.current.store(snapshot.clone());
        snapshot
    }

    /// Set the window that sorts first. Takes effect on the next `replace_all`.
    pub fn set_active_window(&self, window_id: Option<WindowId>) {
        self.active_window.store(Arc::new(window_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: TabId, window_id: WindowId, index: usize) -> Tab {
        Tab::new(id, window_id, index)
    }

    #[test]
    fn test_groups_sorted_by_index() {
        let tabs = vec![tab(3, 1, 2), tab(1, 1, 0), tab(20, 2, 0), tab(2, 1, 1)];
        let groups = group_tabs(&tabs, None);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].window_id, 1);
        assert_eq!(groups[0].tab_ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(groups[1].window_group_number, 2);
    }

    #[test]
    fn test_active_window_sorts_first() {
        let tabs = vec![tab(1, 1, 0), tab(20, 2, 0), tab(30, 3, 0)];
        let groups = group_tabs(&tabs, Some(3));

        assert_eq!(groups.iter().map(|g| g.window_id).collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(groups[0].window_group_number, 1);
    }

    #[test]
    fn test_replace_all_swaps_whole_snapshot() {
        let store = TabGroupStore::new(true);
        let held = store.replace_all(&[tab(1, 1, 0), tab(2, 1, 1)]);

        store.set_active_window(Some(2));
        store.replace_all(&[tab(2, 1, 0), tab(5, 2, 0)]);

        // Old handle is untouched; the store serves the new one.
        assert!(held.find_tab(1).is_some());
        let latest = store.snapshot();
        assert!(latest.find_tab(1).is_none());
        assert_eq!(latest.window_ids(), vec![2, 1]);
        assert_eq!(latest.find_tab(2).map(|t| t.index), Some(0));
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_active_window_ignored_when_disabled() {
        let store = TabGroupStore::new(false);
        store.set_active_window(Some(2));
        let snapshot = store.replace_all(&[tab(1, 1, 0), tab(5, 2, 0)]);
        assert_eq!(snapshot.window_ids(), vec![1, 2]);
    }
}
