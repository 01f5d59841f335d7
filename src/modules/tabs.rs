// Tab reordering module - pure planning logic, no service calls.
// Turns a finished drag into the ordered list of browser move calls.

use serde::Serialize;

use crate::error::DragError;
use crate::modules::drag_selection::DragSelection;
use crate::state::{DropPosition, HitTarget, MoveIndex, MoveProperties, Tab, TabId, WindowId};
use crate::tab_groups::TabSnapshot;

/// One browser call: move `tab_ids` (in order) per `props`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStep {
    pub tab_ids: Vec<TabId>,
    pub props: MoveProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveKind {
    SameWindow,
    CrossWindow { target_window_id: WindowId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePlan {
    pub kind: MoveKind,
    /// Tabs being moved, in their original index order.
    pub tab_ids: Vec<TabId>,
    /// Must run strictly in order, each call awaited before the next.
    pub steps: Vec<MoveStep>,
    pub clear_selection: bool,
}

/// Moving up inserts above the hovered tab, moving down inserts below it.
pub fn drop_position_for(dragged: &Tab, hovered: &Tab) -> DropPosition {
    if dragged.window_id != hovered.window_id {
        return DropPosition::After;
    }
    if dragged.index > hovered.index {
        DropPosition::Before
    } else {
        DropPosition::After
    }
}

/// The whole selection if the dragged tab is part of it, otherwise just the dragged tab.
/// Resolved against `source_tabs` so ids that closed meanwhile fall out.
pub fn tabs_to_move(dragged_id: TabId, source_tabs: &[Tab], selection: &DragSelection) -> Vec<TabId> {
    let source_window = source_tabs.first().map(|t| t.window_id);
    if selection.contains(dragged_id) && selection.window_id() == source_window {
        let ordered = selection.ordered_in(source_tabs);
        if ordered.contains(&dragged_id) {
            return ordered;
        }
    }
    vec![dragged_id]
}

/// Same-window moves, one call per tab.
///
/// Removing a moved tab that sits above the target shifts the target down by
/// one, so a downward move targets `target - moved_above`. Downward moves are
/// issued last tab first, upward moves first tab first.
pub fn plan_same_window(
    window_tabs: &[Tab],
    moving: &[TabId],
    hovered: &Tab,
    position: DropPosition,
) -> Vec<MoveStep> {
    let mut target_index = match position {
        DropPosition::Before => hovered.index,
        DropPosition::After => hovered.index + 1,
    };

    let moving_indices: Vec<usize> = window_tabs
        .iter()
        .filter(|t| t.id.is_some_and(|id| moving.contains(&id)))
        .map(|t| t.index)
        .collect();
    let Some(min_index) = moving_indices.iter().copied().min() else {
        return Vec::new();
    };

    let moving_down = min_index < target_index;
    if moving_down {
        let moved_above = moving_indices.iter().filter(|&&i| i < target_index).count();
        target_index = target_index.saturating_sub(moved_above);
    }

    let step = |offset: usize, id: TabId| MoveStep {
        tab_ids: vec![id],
        props: MoveProperties::to_index(target_index + offset),
    };

    if moving_down {
        moving.iter().enumerate().rev().map(|(offset, id)| step(offset, *id)).collect()
    } else {
        moving.iter().enumerate().map(|(offset, id)| step(offset, *id)).collect()
    }
}

/// Cross-window moves: batch into the target window at the end, then (for a
/// tab drop) batch-reposition to the requested index.
pub fn plan_cross_window(moving: &[TabId], target_window_id: WindowId, target_index: MoveIndex) -> Vec<MoveStep> {
    let mut steps = vec![MoveStep {
        tab_ids: moving.to_vec(),
        props: MoveProperties::to_window(target_window_id, MoveIndex::End),
    }];
    if let MoveIndex::At(_) = target_index {
        steps.push(MoveStep {
            tab_ids: moving.to_vec(),
            props: MoveProperties::to_window(target_window_id, target_index),
        });
    }
    steps
}

/// Plan a drop of `active_id` onto `target`, reading positions from `snapshot` only.
///
/// `Ok(None)` means there is nothing to do (dropped on itself, or on its own window).
/// A stale active tab or target is reported as an error and must not produce calls.
pub fn plan_drop(
    snapshot: &TabSnapshot,
    active_id: TabId,
    target: HitTarget,
    selection: &DragSelection,
) -> Result<Option<MovePlan>, DragError> {
    let dragged = snapshot.find_tab(active_id).ok_or(DragError::TabNotFound(active_id))?;
    let source_window_id = dragged.window_id;
    let source_tabs = snapshot.window_tabs(source_window_id);
    let dragged_selected = selection.contains(active_id) && selection.window_id() == Some(source_window_id);
    let moving = tabs_to_move(active_id, source_tabs, selection);

    match target {
        HitTarget::Tab(hovered_id) => {
            if hovered_id == active_id || moving.contains(&hovered_id) {
                return Ok(None);
            }
            let hovered = snapshot.find_tab(hovered_id).ok_or(DragError::TargetNotFound)?;

            if hovered.window_id == source_window_id {
                let position = drop_position_for(dragged, hovered);
                let steps = plan_same_window(source_tabs, &moving, hovered, position);
                Ok(Some(MovePlan {
                    kind: MoveKind::SameWindow,
                    tab_ids: moving,
                    steps,
                    clear_selection: !dragged_selected,
                }))
            } else {
                // Cross-window drops always land after the hovered tab.
                let target_index = MoveIndex::At(hovered.index + 1);
                let target_window_id = hovered.window_id;
                Ok(Some(MovePlan {
                    kind: MoveKind::CrossWindow { target_window_id },
                    steps: plan_cross_window(&moving, target_window_id, target_index),
                    tab_ids: moving,
                    clear_selection: true,
                }))
            }
        }
        HitTarget::Window(window_id) => {
            if window_id == source_window_id {
                return Ok(None);
            }
            if snapshot.window(window_id).is_none() {
                return Err(DragError::TargetNotFound);
            }
            Ok(Some(MovePlan {
                kind: MoveKind::CrossWindow { target_window_id: window_id },
                steps: plan_cross_window(&moving, window_id, MoveIndex::End),
                tab_ids: moving,
                clear_selection: true,
            }))
        }
    }
}
