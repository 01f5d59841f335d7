// Everything the tab manager page holds, wired together.
// One owner, one event at a time: UI input and background messages both come through here.

use std::sync::Arc;

use crate::channel::BackgroundMessage;
use crate::error::{DragError, ServiceError};
use crate::modules::deletion::{self, is_last_tab_in_window};
use crate::modules::drag::{DragEngine, DragPhase, DragView};
use crate::modules::drag_selection::DragSelection;
use crate::modules::filter::filter_groups;
use crate::modules::hit_test::{HitTest, Point};
use crate::modules::keymap::{KeyAction, KeyChord, Keymap};
use crate::modules::notices::Notices;
use crate::modules::selection::TabSelection;
use crate::modules::tabs::MovePlan;
use crate::service::TabService;
use crate::settings::Settings;
use crate::state::{Tab, TabId, WindowGroup};
use crate::tab_groups::{TabGroupStore, TabSnapshot};

pub struct TabManager {
    store: Arc<TabGroupStore>,
    service: Arc<dyn TabService>,
    engine: DragEngine,
    checkbox: TabSelection,
    drag_selection: DragSelection,
    keymap: Keymap,
    notices: Notices,
    focused_tab: Option<TabId>,
}

impl TabManager {
    pub fn new(service: Arc<dyn TabService>, settings: &Settings) -> Self {
        let store = Arc::new(TabGroupStore::new(settings.active_window_first));
        let engine = DragEngine::new(store.clone(), service.clone(), settings.activation_distance);
        Self {
            store,
            service,
            engine,
            checkbox: TabSelection::new(),
            drag_selection: DragSelection::new(),
            keymap: Keymap::default(),
            notices: Notices::new(settings.max_notices),
            focused_tab: None,
        }
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn snapshot(&self) -> Arc<TabSnapshot> {
        self.store.snapshot()
    }

    pub fn checkbox_selection(&self) -> &TabSelection {
        &self.checkbox
    }

    pub fn drag_selection(&self) -> &DragSelection {
        &self.drag_selection
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    pub fn phase(&self) -> DragPhase {
        self.engine.phase()
    }

    pub fn drag_view(&self) -> DragView {
        self.engine.view(&self.drag_selection)
    }

    pub fn visible_groups(&self, query: &str) -> Vec<WindowGroup> {
        filter_groups(&self.store.snapshot().groups, query)
    }

    // --- Snapshot sync ---

    fn apply_tabs(&mut self, tabs: &[Tab]) {
        let snapshot = self.store.replace_all(tabs);
        self.checkbox.sync_with_existing_tabs(&snapshot.all_tab_ids());
    }

    pub async fn refresh(&mut self) -> Result<(), ServiceError> {
        let tabs = self.service.get_all_tabs().await?;
        self.apply_tabs(&tabs);
        Ok(())
    }

    pub async fn handle_background_message(&mut self, message: BackgroundMessage) {
        match message {
            BackgroundMessage::Tabs { tabs } => self.apply_tabs(&tabs),
            BackgroundMessage::TabEvent { kind } => {
                log::debug!("[TabManager] Tab event {:?}, refreshing", kind);
                if let Err(e) = self.refresh().await {
                    // Keep serving the stale snapshot until the next event.
                    log::warn!("[TabManager] Refresh failed: {}", e);
                }
            }
            BackgroundMessage::ActiveWindow { window_id } => {
                self.store.set_active_window(window_id);
                let tabs = self.store.snapshot().ordered_tabs();
                self.apply_tabs(&tabs);
            }
        }
    }

    // --- Selection ---

    pub fn focus(&mut self, tab_id: TabId) {
        self.focused_tab = Some(tab_id);
    }

    pub fn toggle_checkbox(&mut self, tab_id: TabId) -> bool {
        self.checkbox.toggle(tab_id)
    }

    /// cmd/ctrl-click on a tab.
    pub fn select_for_drag(&mut self, tab_id: TabId) -> bool {
        let Some(window_id) = self.store.snapshot().find_tab(tab_id).map(|t| t.window_id) else {
            return false;
        };
        self.drag_selection.toggle_tab(tab_id, window_id)
    }

    /// shift-click on a tab.
    pub fn shift_select(&mut self, tab_id: TabId) {
        let ordered = self.store.snapshot().ordered_tabs();
        if let Some(position) = ordered.iter().position(|t| t.id == Some(tab_id)) {
            self.drag_selection.extend_to(&ordered, position);
        }
    }

    pub fn clear_drag_selection(&mut self) {
        self.drag_selection.clear();
    }

    // --- Drag ---

    pub fn pointer_down(&mut self, tab_id: TabId, point: Point) -> bool {
        match self.engine.pointer_down(tab_id, point) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("[TabManager] Ignoring pointer down: {}", e);
                false
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point, hit: &dyn HitTest) -> bool {
        match self.engine.pointer_move(point, hit) {
            Ok(changed) => changed,
            Err(e) => {
                log::debug!("[TabManager] Gesture aborted: {}", e);
                true
            }
        }
    }

    pub async fn pointer_up(&mut self) -> Option<MovePlan> {
        self.commit().await
    }

    pub fn cancel_drag(&mut self) {
        self.engine.cancel();
    }

    /// Drop the current gesture. Service failures become notices; stale targets are dropped quietly.
    pub async fn commit(&mut self) -> Option<MovePlan> {
        let pending = match self.engine.drop_gesture(&self.drag_selection) {
            Ok(Some(pending)) => pending,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("[TabManager] Drop discarded: {}", e);
                return None;
            }
        };

        match pending.run(&mut self.drag_selection).await {
            Ok(plan) => Some(plan),
            Err(e) => {
                self.notices.push(format!("Couldn't move tabs: {}", e));
                None
            }
        }
    }

    /// Returns the action the chord resolved to, if any.
    pub async fn handle_key(&mut self, chord: KeyChord) -> Option<KeyAction> {
        let action = self.keymap.resolve(&chord)?;
        match action {
            KeyAction::ToggleCheckbox => {
                if let Some(tab_id) = self.focused_tab {
                    self.toggle_checkbox(tab_id);
                }
            }
            KeyAction::GrabOrDrop => {
                if self.engine.phase() == DragPhase::Dragging {
                    self.commit().await;
                } else if let Some(tab_id) = self.focused_tab {
                    if let Err(e) = self.engine.start_keyboard_drag(tab_id) {
                        log::debug!("[TabManager] Keyboard drag refused: {}", e);
                    }
                }
            }
            KeyAction::MoveTargetUp => {
                self.engine.move_keyboard_target(-1);
            }
            KeyAction::MoveTargetDown => {
                self.engine.move_keyboard_target(1);
            }
            KeyAction::CancelDrag => self.engine.cancel(),
        }
        Some(action)
    }

    // --- Close ---

    /// Close everything ticked: whole windows where every tab is ticked, single tabs otherwise.
    pub async fn close_selected(&mut self) -> usize {
        let snapshot = self.store.snapshot();
        let plan = deletion::analyze(self.checkbox.ids(), &snapshot.ordered_tabs());
        let (report, failure) = match deletion::execute(self.service.as_ref(), &plan).await {
            Ok(report) => (report, None),
            Err((report, e)) => (report, Some(e)),
        };
        for id in &report.closed_tab_ids {
            self.checkbox.deselect(*id);
        }
        if let Some(e) = failure {
            self.notices.push(format!("Couldn't close tabs: {}", e));
        }
        report.closed_tab_ids.len()
    }

    /// Close one tab; closes its window instead if it is the last tab there.
    pub async fn close_tab(&mut self, tab_id: TabId) -> Result<(), DragError> {
        let snapshot = self.store.snapshot();
        let tab = snapshot.find_tab(tab_id).ok_or(DragError::TabNotFound(tab_id))?;
        let window_id = tab.window_id;

        let outcome = if is_last_tab_in_window(tab_id, snapshot.window_tabs(window_id)) {
            self.service.remove_window(window_id).await
        } else {
            self.service.remove_tab(tab_id).await
        };
        if let Err(e) = outcome {
            self.notices.push(format!("Couldn't close tab: {}", e));
            return Err(DragError::ExternalMove(e));
        }
        self.checkbox.deselect(tab_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::TabEventKind;
    use crate::modules::keymap::Key;
    use crate::service::{InMemoryTabService, ServiceCall};
    use crate::state::HitTarget;

    async fn manager(windows: &[(i64, &[TabId])]) -> (TabManager, Arc<InMemoryTabService>) {
        let service = Arc::new(InMemoryTabService::with_windows(windows));
        let mut settings = Settings::default();
        settings.active_window_first = false;
        let mut manager = TabManager::new(service.clone(), &settings);
        manager.refresh().await.unwrap();
        (manager, service)
    }

    #[tokio::test]
    async fn test_refresh_prunes_checkbox_selection() {
        let (mut manager, service) = manager(&[(1, &[1, 2, 3])]).await;
        manager.toggle_checkbox(3);
        manager.toggle_checkbox(1);

        service.remove_tab(3).await.unwrap();
        manager.handle_background_message(BackgroundMessage::TabEvent { kind: TabEventKind::Removed }).await;

        assert_eq!(manager.checkbox_selection().ids(), &[1]);
    }

    #[tokio::test]
    async fn test_tabs_message_replaces_snapshot() {
        let (mut manager, _) = manager(&[(1, &[1, 2])]).await;
        let tabs = vec![Tab::new(9, 4, 0)];
        manager.handle_background_message(BackgroundMessage::Tabs { tabs }).await;
        assert_eq!(manager.snapshot().all_tab_ids(), vec![9]);
    }

    #[tokio::test]
    async fn test_active_window_message_reorders() {
        let service = Arc::new(InMemoryTabService::with_windows(&[(1, &[1]), (2, &[2])]));
        let mut manager = TabManager::new(service, &Settings::default());
        manager.refresh().await.unwrap();
        manager
            .handle_background_message(BackgroundMessage::ActiveWindow { window_id: Some(2) })
            .await;
        assert_eq!(manager.snapshot().window_ids(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_keyboard_drag_round_trip() {
        let (mut manager, service) = manager(&[(1, &[1, 2, 3])]).await;
        manager.focus(1);

        // Space ticks the checkbox; it never starts a drag.
        manager.handle_key(KeyChord::plain(Key::Space)).await;
        assert_eq!(manager.phase(), DragPhase::Idle);
        assert!(manager.checkbox_selection().contains(1));

        manager.handle_key(KeyChord::plain(Key::Enter)).await;
        assert_eq!(manager.phase(), DragPhase::Dragging);
        manager.handle_key(KeyChord::plain(Key::ArrowDown)).await;
        manager.handle_key(KeyChord::plain(Key::ArrowDown)).await;
        assert_eq!(manager.drag_view().over_id, Some(HitTarget::Tab(3)));

        manager.handle_key(KeyChord::plain(Key::Enter)).await;
        assert_eq!(manager.phase(), DragPhase::Idle);
        assert_eq!(service.window_order(1), vec![2, 3, 1]);
        // Checkbox selection survives the drag.
        assert!(manager.checkbox_selection().contains(1));
    }

    #[tokio::test]
    async fn test_escape_cancels_keyboard_drag() {
        let (mut manager, service) = manager(&[(1, &[1, 2, 3])]).await;
        manager.focus(2);
        manager.handle_key(KeyChord::plain(Key::Enter)).await;
        manager.handle_key(KeyChord::plain(Key::ArrowUp)).await;
        manager.handle_key(KeyChord::plain(Key::Escape)).await;

        assert_eq!(manager.drag_view(), DragView::default());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_move_becomes_notice() {
        let (mut manager, service) = manager(&[(1, &[1, 2, 3])]).await;
        manager.select_for_drag(1);
        manager.select_for_drag(2);
        service.fail_after(0);

        manager.focus(1);
        manager.handle_key(KeyChord::plain(Key::Enter)).await;
        manager.handle_key(KeyChord::plain(Key::ArrowDown)).await;
        manager.handle_key(KeyChord::plain(Key::ArrowDown)).await;
        assert!(manager.commit().await.is_none());

        assert_eq!(manager.notices().len(), 1);
        assert_eq!(manager.drag_selection().len(), 2);
        assert_eq!(manager.phase(), DragPhase::Idle);
    }

    #[tokio::test]
    async fn test_close_selected_mixed() {
        let (mut manager, service) = manager(&[(1, &[1, 2]), (2, &[3, 4, 5])]).await;
        for id in [1, 2, 4] {
            manager.toggle_checkbox(id);
        }

        assert_eq!(manager.close_selected().await, 3);
        assert!(manager.checkbox_selection().is_empty());
        assert_eq!(
            service.calls(),
            vec![ServiceCall::RemoveWindow(1), ServiceCall::RemoveTabs(vec![4])]
        );
    }

    #[tokio::test]
    async fn test_close_last_tab_closes_window() {
        let (mut manager, service) = manager(&[(1, &[1]), (2, &[3, 4])]).await;
        manager.close_tab(1).await.unwrap();
        manager.close_tab(3).await.unwrap();
        assert_eq!(
            service.calls(),
            vec![ServiceCall::RemoveWindow(1), ServiceCall::RemoveTabs(vec![3])]
        );
        assert!(matches!(manager.close_tab(42).await, Err(DragError::TabNotFound(42))));
    }
}
