// The browser's tab/window API, seen from the manager page.
// Everything that mutates real tabs goes through `TabService`.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::ServiceError;
use crate::state::{MoveIndex, MoveProperties, Tab, TabId, WindowId};

#[async_trait]
pub trait TabService: Send + Sync {
    async fn get_all_tabs(&self) -> Result<Vec<Tab>, ServiceError>;

    async fn move_tab(&self, tab_id: TabId, props: MoveProperties) -> Result<(), ServiceError>;

    /// Moves the ids in the given order, so their relative order is kept at the destination.
    async fn move_tabs(&self, tab_ids: &[TabId], props: MoveProperties) -> Result<(), ServiceError>;

    async fn remove_tab(&self, tab_id: TabId) -> Result<(), ServiceError>;

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), ServiceError> {
        for id in tab_ids {
            self.remove_tab(*id).await?;
        }
        Ok(())
    }

    async fn remove_window(&self, window_id: WindowId) -> Result<(), ServiceError>;
}

/// Every mutating call the in-memory service received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Move { tab_ids: Vec<TabId>, props: MoveProperties },
    RemoveTabs(Vec<TabId>),
    RemoveWindow(WindowId),
}

#[derive(Debug)]
struct WindowSlot {
    id: WindowId,
    tabs: Vec<Tab>,
}

#[derive(Debug, Default)]
struct Inner {
    windows: Vec<WindowSlot>,
    calls: Vec<ServiceCall>,
    /// Number of further mutating calls allowed before every call is rejected.
    fail_after: Option<usize>,
}

/// In-memory browser with the same index semantics as the real one:
/// a move removes the tab first and then inserts it, `End` appends,
/// and a window disappears with its last tab.
#[derive(Debug, Default)]
pub struct InMemoryTabService {
    inner: Mutex<Inner>,
}

impl InMemoryTabService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_windows(windows: &[(WindowId, &[TabId])]) -> Self {
        let mut inner = Inner::default();
        for (window_id, ids) in windows {
            let tabs = ids
                .iter()
                .enumerate()
                .map(|(index, id)| Tab::new(*id, *window_id, index))
                .collect();
            inner.windows.push(WindowSlot { id: *window_id, tabs });
        }
        Self { inner: Mutex::new(inner) }
    }

    pub fn from_tabs(mut tabs: Vec<Tab>) -> Self {
        let mut inner = Inner::default();
        tabs.sort_by_key(|t| (t.window_id, t.index));
        for tab in tabs {
            match inner.windows.iter_mut().find(|w| w.id == tab.window_id) {
                Some(slot) => slot.tabs.push(tab),
                None => inner.windows.push(WindowSlot { id: tab.window_id, tabs: vec![tab] }),
            }
        }
        for slot in &mut inner.windows {
            renumber(slot);
        }
        Self { inner: Mutex::new(inner) }
    }

    /// Reject every mutating call after `calls` more have succeeded.
    pub fn fail_after(&self, calls: usize) {
        self.lock().fail_after = Some(calls);
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    /// Tab ids of one window in index order (empty if the window is gone).
    pub fn window_order(&self, window_id: WindowId) -> Vec<TabId> {
        self.lock()
            .windows
            .iter()
            .find(|w| w.id == window_id)
            .map(|w| w.tabs.iter().filter_map(|t| t.id).collect())
            .unwrap_or_default()
    }

    pub fn has_window(&self, window_id: WindowId) -> bool {
        self.lock().windows.iter().any(|w| w.id == window_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn renumber(slot: &mut WindowSlot) {
    for (index, tab) in slot.tabs.iter_mut().enumerate() {
        tab.index = index;
        tab.window_id = slot.id;
    }
}

impl Inner {
    fn check_budget(&mut self) -> Result<(), ServiceError> {
        match self.fail_after {
            Some(0) => Err(ServiceError::Rejected("tab service unavailable".to_string())),
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn locate(&self, tab_id: TabId) -> Option<(usize, usize)> {
        self.windows.iter().enumerate().find_map(|(w, slot)| {
            slot.tabs.iter().position(|t| t.id == Some(tab_id)).map(|p| (w, p))
        })
    }

    fn move_one(&mut self, tab_id: TabId, props: MoveProperties) -> Result<(), ServiceError> {
        let (src, pos) = self.locate(tab_id).ok_or(ServiceError::NoSuchTab(tab_id))?;
        let dest_id = props.window_id.unwrap_or(self.windows[src].id);
        if !self.windows.iter().any(|w| w.id == dest_id) {
            return Err(ServiceError::NoSuchWindow(dest_id));
        }

        let tab = self.windows[src].tabs.remove(pos);
        // Index lookup happens after removal, which is what shifts later positions.
        let dest = self
            .windows
            .iter()
            .position(|w| w.id == dest_id)
            .ok_or(ServiceError::NoSuchWindow(dest_id))?;
        let slot = &mut self.windows[dest];
        match props.index {
            MoveIndex::At(i) => slot.tabs.insert(i.min(slot.tabs.len()), tab),
            MoveIndex::End => slot.tabs.push(tab),
        }
        renumber(slot);
        renumber(&mut self.windows[src]);
        self.windows.retain(|w| !w.tabs.is_empty());
        Ok(())
    }
}

#[async_trait]
impl TabService for InMemoryTabService {
    async fn get_all_tabs(&self) -> Result<Vec<Tab>, ServiceError> {
        let inner = self.lock();
        Ok(inner.windows.iter().flat_map(|w| w.tabs.iter().cloned()).collect())
    }

    async fn move_tab(&self, tab_id: TabId, props: MoveProperties) -> Result<(), ServiceError> {
        self.move_tabs(&[tab_id], props).await
    }

    async fn move_tabs(&self, tab_ids: &[TabId], props: MoveProperties) -> Result<(), ServiceError> {
        let mut inner = self.lock();
        inner.check_budget()?;
        inner.calls.push(ServiceCall::Move { tab_ids: tab_ids.to_vec(), props });
        for (offset, id) in tab_ids.iter().enumerate() {
            let index = match props.index {
                MoveIndex::At(i) => MoveIndex::At(i + offset),
                MoveIndex::End => MoveIndex::End,
            };
            inner.move_one(*id, MoveProperties { index, window_id: props.window_id })?;
        }
        Ok(())
    }

    async fn remove_tab(&self, tab_id: TabId) -> Result<(), ServiceError> {
        self.remove_tabs(&[tab_id]).await
    }

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), ServiceError> {
        let mut inner = self.lock();
        inner.check_budget()?;
        inner.calls.push(ServiceCall::RemoveTabs(tab_ids.to_vec()));
        let mut result = Ok(());
        for id in tab_ids {
            let Some((w, pos)) = inner.locate(*id) else {
                result = Err(ServiceError::NoSuchTab(*id));
                break;
            };
            inner.windows[w].tabs.remove(pos);
            renumber(&mut inner.windows[w]);
        }
        inner.windows.retain(|w| !w.tabs.is_empty());
        result
    }

    async fn remove_window(&self, window_id: WindowId) -> Result<(), ServiceError> {
        let mut inner = self.lock();
        inner.check_budget()?;
        inner.calls.push(ServiceCall::RemoveWindow(window_id));
        let before = inner.windows.len();
        inner.windows.retain(|w| w.id != window_id);
        if inner.windows.len() == before {
            return Err(ServiceError::NoSuchWindow(window_id));
        }
        Ok(())
    }
}
