use crate::state::{Tab, TabId, WindowId};

/// Ids for a shift-click range over the display order.
///
/// Slices `ordered_tabs[min..=max]` and keeps only tabs of `window_id` that have an id.
/// Tabs of other windows inside the slice are excluded, not just skipped.
pub fn range_for_window(
    ordered_tabs: &[Tab],
    start_index: usize,
    end_index: usize,
    window_id: WindowId,
) -> Vec<TabId> {
    if ordered_tabs.is_empty() {
        return Vec::new();
    }
    let lo = start_index.min(end_index);
    let hi = start_index.max(end_index).min(ordered_tabs.len() - 1);
    if lo > hi {
        return Vec::new();
    }

    ordered_tabs[lo..=hi]
        .iter()
        .filter(|t| t.window_id == window_id)
        .filter_map(|t| t.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Display order interleaves windows 1 and 2; one tab has no id.
    fn ordered() -> Vec<Tab> {
        let mut anonymous = Tab::new(0, 1, 3);
        anonymous.id = None;
        vec![
            Tab::new(10, 1, 0),
            Tab::new(11, 1, 1),
            Tab::new(20, 2, 0),
            Tab::new(12, 1, 2),
            anonymous,
            Tab::new(21, 2, 1),
            Tab::new(13, 1, 4),
        ]
    }

    #[rstest]
    #[case(0, 3, 1, vec![10, 11, 12])]
    #[case(3, 0, 1, vec![10, 11, 12])]
    #[case(1, 6, 1, vec![11, 12, 13])]
    #[case(0, 6, 2, vec![20, 21])]
    #[case(2, 2, 1, vec![])]
    #[case(4, 4, 1, vec![])]
    #[case(5, 40, 1, vec![13])]
    fn test_range_for_window(
        #[case] start: usize,
        #[case] end: usize,
        #[case] window: WindowId,
        #[case] expected: Vec<TabId>,
    ) {
        assert_eq!(range_for_window(&ordered(), start, end, window), expected);
    }

    #[test]
    fn test_range_is_symmetric() {
        let tabs = ordered();
        for i in 0..tabs.len() {
            for j in 0..tabs.len() {
                assert_eq!(range_for_window(&tabs, i, j, 1), range_for_window(&tabs, j, i, 1));
            }
        }
    }

    #[test]
    fn test_out_of_bounds_start() {
        assert!(range_for_window(&ordered(), 50, 60, 1).is_empty());
        assert!(range_for_window(&[], 0, 3, 1).is_empty());
    }
}
