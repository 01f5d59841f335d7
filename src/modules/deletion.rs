// Bulk close planning + execution.
// Planning is pure; execution is a short saga against the tab service.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::ServiceError;
use crate::service::TabService;
use crate::state::{Tab, TabId, WindowId};
use crate::tab_groups::group_tabs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDeletion {
    pub window_id: WindowId,
    /// In window index order.
    pub selected_tab_ids: Vec<TabId>,
    pub total_tabs_in_window: usize,
    pub is_full_window_selection: bool,
}

/// One record per window with at least one selected tab.
pub fn analyze(selected_tab_ids: &[TabId], all_tabs: &[Tab]) -> Vec<WindowDeletion> {
    let selected: HashSet<TabId> = selected_tab_ids.iter().copied().collect();

    group_tabs(all_tabs, None)
        .into_iter()
        .filter_map(|group| {
            let in_window: Vec<TabId> = group.tab_ids().filter(|id| selected.contains(id)).collect();
            if in_window.is_empty() {
                return None;
            }
            let total = group.tabs.len();
            Some(WindowDeletion {
                window_id: group.window_id,
                is_full_window_selection: in_window.len() == total,
                selected_tab_ids: in_window,
                total_tabs_in_window: total,
            })
        })
        .collect()
}

/// True iff `window_tabs` holds exactly one tab with an id, and it is `tab_id`.
pub fn is_last_tab_in_window(tab_id: TabId, window_tabs: &[Tab]) -> bool {
    let mut ids = window_tabs.iter().filter_map(|t| t.id);
    matches!((ids.next(), ids.next()), (Some(only), None) if only == tab_id)
}

/// Result of running a deletion plan.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub closed_tab_ids: Vec<TabId>,
    pub closed_windows: Vec<WindowId>,
}

/// Close whole windows for full selections, individual tabs otherwise.
/// Stops at the first failure; whatever already closed stays closed.
pub async fn execute(
    service: &dyn TabService,
    plan: &[WindowDeletion],
) -> Result<DeletionReport, (DeletionReport, ServiceError)> {
    let mut report = DeletionReport::default();
    for record in plan {
        let outcome = if record.is_full_window_selection {
            service.remove_window(record.window_id).await
        } else {
            service.remove_tabs(&record.selected_tab_ids).await
        };
        if let Err(e) = outcome {
            log::warn!("[Delete] Window {} failed: {}", record.window_id, e);
            return Err((report, e));
        }
        if record.is_full_window_selection {
            report.closed_windows.push(record.window_id);
        }
        report.closed_tab_ids.extend(&record.selected_tab_ids);
    }
    log::info!(
        "[Delete] Closed {} tabs ({} whole windows)",
        report.closed_tab_ids.len(),
        report.closed_windows.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{InMemoryTabService, ServiceCall};
    use rstest::rstest;

    fn tabs() -> Vec<Tab> {
        vec![
            Tab::new(1, 100, 0),
            Tab::new(2, 100, 1),
            Tab::new(3, 200, 0),
            Tab::new(4, 200, 1),
            Tab::new(5, 200, 2),
            Tab::new(6, 300, 0),
        ]
    }

    #[test]
    fn test_analyze_classifies_windows() {
        let plan = analyze(&[4, 1, 2, 3], &tabs());
        assert_eq!(
            plan,
            vec![
                WindowDeletion {
                    window_id: 100,
                    selected_tab_ids: vec![1, 2],
                    total_tabs_in_window: 2,
                    is_full_window_selection: true,
                },
                WindowDeletion {
                    window_id: 200,
                    selected_tab_ids: vec![3, 4],
                    total_tabs_in_window: 3,
                    is_full_window_selection: false,
                },
            ]
        );
    }

    #[test]
    fn test_analyze_omits_untouched_windows() {
        assert!(analyze(&[], &tabs()).is_empty());
        assert!(analyze(&[99], &tabs()).is_empty());
        let plan = analyze(&[6], &tabs());
        assert_eq!(plan.len(), 1);
        assert!(plan[0].is_full_window_selection);
    }

    #[rstest]
    #[case(&[(7, true)], 7, true)]
    #[case(&[(7, true)], 8, false)]
    #[case(&[(7, true), (8, true)], 7, false)]
    #[case(&[(7, true), (8, false)], 7, true)]
    #[case(&[], 7, false)]
    fn test_is_last_tab_in_window(#[case] window: &[(TabId, bool)], #[case] tab_id: TabId, #[case] expected: bool) {
        let window_tabs: Vec<Tab> = window
            .iter()
            .enumerate()
            .map(|(i, (id, has_id))| {
                let mut tab = Tab::new(*id, 1, i);
                if !has_id {
                    tab.id = None;
                }
                tab
            })
            .collect();
        assert_eq!(is_last_tab_in_window(tab_id, &window_tabs), expected);
    }

    #[tokio::test]
    async fn test_execute_full_and_partial() {
        let service = InMemoryTabService::with_windows(&[(100, &[1, 2]), (200, &[3, 4, 5])]);
        let all = service.get_all_tabs().await.unwrap();
        let plan = analyze(&[1, 2, 4], &all);

        let report = execute(&service, &plan).await.unwrap();
        assert_eq!(report.closed_windows, vec![100]);
        assert_eq!(report.closed_tab_ids, vec![1, 2, 4]);
        assert_eq!(
            service.calls(),
            vec![ServiceCall::RemoveWindow(100), ServiceCall::RemoveTabs(vec![4])]
        );
        assert_eq!(service.window_order(200), vec![3, 5]);
    }

    #[tokio::test]
    async fn test_execute_stops_at_first_failure() {
        let service = InMemoryTabService::with_windows(&[(100, &[1, 2]), (200, &[3, 4]), (300, &[5, 6])]);
        let all = service.get_all_tabs().await.unwrap();
        let plan = analyze(&[1, 3, 5], &all);
        service.fail_after(1);

        let (partial, err) = execute(&service, &plan).await.unwrap_err();
        assert_eq!(partial.closed_tab_ids, vec![1]);
        assert!(matches!(err, ServiceError::Rejected(_)));
        assert_eq!(service.window_order(300), vec![5, 6]);
    }
}
