// Drag gesture state machine.
//
// Idle -> Activating -> Dragging -> (commit | cancel) -> Idle
//
// Positions are always read from the store's latest snapshot, never from
// values captured at gesture start.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::DragError;
use crate::modules::drag_selection::DragSelection;
use crate::modules::hit_test::{HitTest, Point};
use crate::modules::tabs::{drop_position_for, plan_drop, MovePlan};
use crate::service::TabService;
use crate::state::{DropPosition, HitTarget, TabId, WindowId};
use crate::tab_groups::TabGroupStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Idle,
    Activating,
    Dragging,
    Committing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragGesture {
    pub active_tab_id: TabId,
    pub source_window_id: WindowId,
    pub over_target: Option<HitTarget>,
    /// Set only while hovering something in another window.
    pub over_window_id: Option<WindowId>,
    pub drop_position: Option<DropPosition>,
    pub via_keyboard: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Activating { tab_id: TabId, origin: Point },
    Dragging(DragGesture),
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragView {
    pub active_id: Option<TabId>,
    pub over_id: Option<HitTarget>,
    pub drop_position: Option<DropPosition>,
    pub over_window_id: Option<WindowId>,
    pub selected_count: usize,
}

/// Holds the single-flight flag for as long as a commit is alive.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A planned drop that has not touched the browser yet.
pub struct PendingCommit {
    plan: MovePlan,
    service: Arc<dyn TabService>,
    _guard: FlightGuard,
}

impl std::fmt::Debug for PendingCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCommit").field("plan", &self.plan).finish_non_exhaustive()
    }
}

impl PendingCommit {
    pub fn plan(&self) -> &MovePlan {
        &self.plan
    }

    /// Issue the planned calls one at a time. The first failure abandons the
    /// rest; nothing is rolled back and the selection is left untouched.
    pub async fn run(self, selection: &mut DragSelection) -> Result<MovePlan, DragError> {
        for (i, step) in self.plan.steps.iter().enumerate() {
            let outcome = match step.tab_ids.as_slice() {
                [only] => self.service.move_tab(*only, step.props).await,
                ids => self.service.move_tabs(ids, step.props).await,
            };
            if let Err(e) = outcome {
                log::warn!(
                    "[DragEngine] Step {}/{} failed, abandoning commit: {}",
                    i + 1,
                    self.plan.steps.len(),
                    e
                );
                return Err(DragError::ExternalMove(e));
            }
        }

        if self.plan.clear_selection {
            selection.clear();
        }
        log::info!(
            "[DragEngine] Moved {:?} ({:?}, {} calls)",
            self.plan.tab_ids,
            self.plan.kind,
            self.plan.steps.len()
        );
        Ok(self.plan)
    }
}

pub struct DragEngine {
    store: Arc<TabGroupStore>,
    service: Arc<dyn TabService>,
    gesture: Gesture,
    activation_distance: f64,
    in_flight: Arc<AtomicBool>,
}

impl DragEngine {
    pub fn new(store: Arc<TabGroupStore>, service: Arc<dyn TabService>, activation_distance: f64) -> Self {
        Self {
            store,
            service,
            gesture: Gesture::Idle,
            activation_distance,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn phase(&self) -> DragPhase {
        if self.is_busy() {
            return DragPhase::Committing;
        }
        match self.gesture {
            Gesture::Idle => DragPhase::Idle,
            Gesture::Activating { .. } => DragPhase::Activating,
            Gesture::Dragging(_) => DragPhase::Dragging,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        match &self.gesture {
            Gesture::Dragging(g) => Some(g),
            _ => None,
        }
    }

    pub fn view(&self, selection: &DragSelection) -> DragView {
        let mut view = DragView { selected_count: selection.len(), ..DragView::default() };
        if let Some(g) = self.gesture() {
            view.active_id = Some(g.active_tab_id);
            view.over_id = g.over_target;
            view.drop_position = g.drop_position;
            view.over_window_id = g.over_window_id;
        }
        view
    }

    fn ensure_idle(&self) -> Result<(), DragError> {
        if self.is_busy() {
            return Err(DragError::Busy);
        }
        Ok(())
    }

    /// Press on a drag handle. Nothing moves until the pointer travels far enough.
    pub fn pointer_down(&mut self, tab_id: TabId, origin: Point) -> Result<(), DragError> {
        self.ensure_idle()?;
        self.gesture = Gesture::Activating { tab_id, origin };
        Ok(())
    }

    /// Keyboard drags skip the travel threshold.
    pub fn start_keyboard_drag(&mut self, tab_id: TabId) -> Result<(), DragError> {
        self.ensure_idle()?;
        self.activate(tab_id, true)
    }

    fn activate(&mut self, tab_id: TabId, via_keyboard: bool) -> Result<(), DragError> {
        let snapshot = self.store.snapshot();
        let Some(tab) = snapshot.find_tab(tab_id) else {
            self.gesture = Gesture::Idle;
            return Err(DragError::TabNotFound(tab_id));
        };
        log::debug!("[DragEngine] Drag start: tab {} in window {}", tab_id, tab.window_id);
        self.gesture = Gesture::Dragging(DragGesture {
            active_tab_id: tab_id,
            source_window_id: tab.window_id,
            over_target: None,
            over_window_id: None,
            drop_position: None,
            via_keyboard,
        });
        Ok(())
    }

    /// Returns whether the visible drag state changed.
    pub fn pointer_move(&mut self, point: Point, hit: &dyn HitTest) -> Result<bool, DragError> {
        match &self.gesture {
            Gesture::Idle => Ok(false),
            Gesture::Activating { tab_id, origin } => {
                if origin.distance_to(point) < self.activation_distance {
                    return Ok(false);
                }
                let tab_id = *tab_id;
                self.activate(tab_id, false)?;
                self.track(point, hit)?;
                Ok(true)
            }
            Gesture::Dragging(_) => self.track(point, hit),
        }
    }

    fn track(&mut self, point: Point, hit: &dyn HitTest) -> Result<bool, DragError> {
        let target = match hit.topmost_at(point) {
            Ok(target) => target,
            Err(e) => {
                log::warn!("[DragEngine] Aborting gesture: {}", e);
                self.reset();
                return Err(e.into());
            }
        };
        Ok(self.hover(target))
    }

    /// Update over-tracking for `target`. Returns whether anything changed.
    pub fn hover(&mut self, target: Option<HitTarget>) -> bool {
        let snapshot = self.store.snapshot();
        let Gesture::Dragging(gesture) = &mut self.gesture else {
            return false;
        };
        let before = gesture.clone();

        gesture.over_target = None;
        gesture.over_window_id = None;
        gesture.drop_position = None;

        match target {
            Some(HitTarget::Tab(id)) => {
                let dragged = snapshot.find_tab(gesture.active_tab_id);
                // A target that closed counts as no target.
                if let (Some(dragged), Some(hovered)) = (dragged, snapshot.find_tab(id)) {
                    gesture.over_target = target;
                    if hovered.window_id != gesture.source_window_id {
                        gesture.over_window_id = Some(hovered.window_id);
                    }
                    if id != gesture.active_tab_id {
                        gesture.drop_position = Some(drop_position_for(dragged, hovered));
                    }
                }
            }
            Some(HitTarget::Window(window_id)) => {
                if snapshot.window(window_id).is_some() {
                    gesture.over_target = target;
                    if window_id != gesture.source_window_id {
                        gesture.over_window_id = Some(window_id);
                    }
                }
            }
            None => {}
        }

        *gesture != before
    }

    /// Keyboard drag: step the target through the display order.
    pub fn move_keyboard_target(&mut self, delta: isize) -> bool {
        let snapshot = self.store.snapshot();
        let Some(gesture) = self.gesture() else {
            return false;
        };
        let ordered = snapshot.all_tab_ids();
        let current = match gesture.over_target {
            Some(HitTarget::Tab(id)) => id,
            _ => gesture.active_tab_id,
        };
        let Some(pos) = ordered.iter().position(|id| *id == current) else {
            return false;
        };
        let next = (pos as isize + delta).clamp(0, ordered.len() as isize - 1) as usize;
        self.hover(Some(HitTarget::Tab(ordered[next])))
    }

    pub fn cancel(&mut self) {
        if let Gesture::Dragging(g) = &self.gesture {
            log::debug!("[DragEngine] Drag of tab {} cancelled", g.active_tab_id);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Release (or keyboard confirm). Over-state is cleared whatever happens.
    ///
    /// `Ok(None)`: nothing to do (released outside a target, on itself, or a plain click).
    /// `Err`: the dragged tab or target vanished; no calls were planned.
    pub fn drop_gesture(&mut self, selection: &DragSelection) -> Result<Option<PendingCommit>, DragError> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let Gesture::Dragging(gesture) = gesture else {
            return Ok(None);
        };
        let Some(target) = gesture.over_target else {
            log::debug!("[DragEngine] Released outside any target");
            return Ok(None);
        };
        self.ensure_idle()?;

        let snapshot = self.store.snapshot();
        let plan = match plan_drop(&snapshot, gesture.active_tab_id, target, selection) {
            Ok(Some(plan)) => plan,
            Ok(None) => return Ok(None),
            Err(e) => {
                log::info!("[DragEngine] Dropping without moves: {}", e);
                return Err(e);
            }
        };

        self.in_flight.store(true, Ordering::Release);
        Ok(Some(PendingCommit {
            plan,
            service: self.service.clone(),
            _guard: FlightGuard(self.in_flight.clone()),
        }))
    }
}
