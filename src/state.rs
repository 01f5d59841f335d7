// Shared state structs to avoid circular dependencies.
// These are what the background process sends us and what every module reads.

use serde::{Deserialize, Serialize};

pub type TabId = i64;
pub type WindowId = i64;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default)]
    pub id: Option<TabId>,
    pub window_id: WindowId,
    pub index: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl Tab {
    pub fn new(id: TabId, window_id: WindowId, index: usize) -> Self {
        Self {
            id: Some(id),
            window_id,
            index,
            title: format!("Tab {}", id),
            url: format!("https://example.com/{}", id),
        }
    }
}

/// A browser window and its tabs in index order.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WindowGroup {
    pub window_id: WindowId,
    pub tabs: Vec<Tab>,
    /// Display ordinal, 1-based. Assigned by us, never by the browser.
    pub window_group_number: usize,
}

impl WindowGroup {
    pub fn tab_ids(&self) -> impl Iterator<Item = TabId> + '_ {
        self.tabs.iter().filter_map(|t| t.id)
    }
}

/// Where the dragged tabs land relative to the hovered tab.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

/// Anything a drag can hover: a specific tab, or a whole window container.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum HitTarget {
    Tab(TabId),
    Window(WindowId),
}

/// Destination index for a move. `End` is the browser's `-1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveIndex {
    At(usize),
    End,
}

impl Serialize for MoveIndex {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MoveIndex::At(i) => serializer.serialize_i64(*i as i64),
            MoveIndex::End => serializer.serialize_i64(-1),
        }
    }
}

impl<'de> Deserialize<'de> for MoveIndex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            Ok(MoveIndex::End)
        } else {
            Ok(MoveIndex::At(raw as usize))
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveProperties {
    pub index: MoveIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
}

impl MoveProperties {
    pub fn to_index(index: usize) -> Self {
        Self { index: MoveIndex::At(index), window_id: None }
    }

    pub fn to_window(window_id: WindowId, index: MoveIndex) -> Self {
        Self { index, window_id: Some(window_id) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_deserializes_from_browser_json() {
        let json = r#"{"id": 7, "windowId": 100, "index": 2, "title": "Docs", "url": "https://docs.rs/"}"#;
        let tab: Tab = serde_json::from_str(json).unwrap();
        assert_eq!(tab.id, Some(7));
        assert_eq!(tab.window_id, 100);
        assert_eq!(tab.index, 2);
    }

    #[test]
    fn test_tab_without_id() {
        let json = r#"{"windowId": 1, "index": 0}"#;
        let tab: Tab = serde_json::from_str(json).unwrap();
        assert_eq!(tab.id, None);
        assert!(tab.title.is_empty());
    }

    #[test]
    fn test_move_properties_wire_format() {
        let props = MoveProperties::to_window(200, MoveIndex::End);
        assert_eq!(
            serde_json::to_value(props).unwrap(),
            serde_json::json!({"index": -1, "windowId": 200})
        );

        let props: MoveProperties = serde_json::from_str(r#"{"index": 3}"#).unwrap();
        assert_eq!(props, MoveProperties::to_index(3));
    }
}
