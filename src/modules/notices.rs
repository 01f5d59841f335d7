use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// A dismissible error message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Notices {
    items: VecDeque<Notice>,
    next_id: u64,
    limit: usize,
}

impl Notices {
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::new(),
            next_id: 1,
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let notice = Notice { id, message: message.into(), created_at: Utc::now() };
        log::info!("[Notices] #{}: {}", id, notice.message);
        self.items.push_back(notice);

        // Oldest first out
        while self.items.len() > self.limit {
            self.items.pop_front();
        }
        id
    }

    /// Returns false if the notice was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut notices = Notices::new(5);
        let a = notices.push("first");
        let b = notices.push("second");

        assert!(notices.dismiss(a));
        assert!(!notices.dismiss(a));
        assert_eq!(notices.iter().map(|n| n.id).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut notices = Notices::new(2);
        notices.push("one");
        notices.push("two");
        notices.push("three");

        let messages: Vec<&str> = notices.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_notice_serializes_timestamp() {
        let mut notices = Notices::new(1);
        notices.push("move failed");
        let notice = notices.iter().next().unwrap();

        let json = serde_json::to_value(notice).unwrap();
        assert_eq!(json["message"], "move failed");
        let created_at = json["createdAt"].as_str().unwrap();
        assert_eq!(created_at.parse::<DateTime<Utc>>().unwrap(), notice.created_at);
    }
}
