// Search box filtering over window groups.

use url::Url;

use crate::state::{Tab, WindowGroup};

fn matches(tab: &Tab, query: &str) -> bool {
    let title = tab.title.to_lowercase();
    let url = tab.url.to_lowercase();
    if title.contains(query) || url.contains(query) {
        return true;
    }
    // "goo" should find https://www.google.com even though the url string doesn't start with it.
    Url::parse(&tab.url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_lowercase()))
        .is_some_and(|host| host.starts_with(query))
}

/// Tabs whose title/url contain `query`, or whose host starts with it.
/// Windows with no matching tab are dropped; group numbers are kept.
pub fn filter_groups(groups: &[WindowGroup], query: &str) -> Vec<WindowGroup> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return groups.to_vec();
    }

    groups
        .iter()
        .filter_map(|group| {
            let tabs: Vec<Tab> = group.tabs.iter().filter(|t| matches(t, &query)).cloned().collect();
            if tabs.is_empty() {
                None
            } else {
                Some(WindowGroup { tabs, ..group.clone() })
            }
        })
        .collect()
}
