use crate::engine::HabitEvent;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;

pub const TOAST_LIMIT: usize = 2;
pub const TOAST_DURATION_MS: i64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Transient messages. Never holds more than `limit`; oldest goes first.
#[derive(Debug)]
pub struct ToastQueue {
    limit: usize,
    lifetime: Duration,
    next_id: u64,
    toasts: VecDeque<Toast>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(TOAST_LIMIT, Duration::milliseconds(TOAST_DURATION_MS))
    }
}

impl ToastQueue {
    pub fn new(limit: usize, lifetime: Duration) -> Self {
        Self {
            limit: limit.max(1),
            lifetime,
            next_id: 0,
            toasts: VecDeque::new(),
        }
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        self.next_id += 1;
        self.toasts.push_back(Toast {
            id: self.next_id,
            kind,
            message: message.into(),
            created_at: now,
        });
        while self.toasts.len() > self.limit {
            self.toasts.pop_front();
        }
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    /// Drops expired toasts and returns what is still on screen.
    pub fn visible(&mut self, now: DateTime<Utc>) -> Vec<Toast> {
        let lifetime = self.lifetime;
        self.toasts.retain(|toast| now - toast.created_at < lifetime);
        self.toasts.iter().cloned().collect()
    }
}

/// Message shown for an engine event.
pub fn toast_for(event: &HabitEvent) -> (ToastKind, String) {
    match event {
        HabitEvent::Added { .. } => (ToastKind::Success, "Habit added successfully!".to_string()),
        HabitEvent::Removed { .. } => (ToastKind::Info, "Habit removed.".to_string()),
        HabitEvent::Reset => (ToastKind::Success, "All habits removed.".to_string()),
        HabitEvent::Milestone { name, milestone, .. } => (
            ToastKind::Success,
            format!("Congratulations! {name} reached {}!", milestone.label()),
        ),
        HabitEvent::AllIncremented { .. } => {
            (ToastKind::Success, "Days increased for all habits.".to_string())
        }
        HabitEvent::Rejected { error } => (ToastKind::Warning, error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn milestone_message_names_habit() {
        let event = HabitEvent::Milestone {
            id: crate::models::HabitId::new(),
            name: "Running".to_string(),
            milestone: crate::models::Milestone::TwoWeeks,
        };
        let (kind, message) = toast_for(&event);
        assert_eq!(kind, ToastKind::Success);
        assert_eq!(message, "Congratulations! Running reached two weeks!");
    }

    #[test]
    fn keeps_at_most_two_dropping_oldest() {
        let mut queue = ToastQueue::default();
        queue.push(ToastKind::Success, "one", t0());
        queue.push(ToastKind::Info, "two", t0());
        queue.push(ToastKind::Warning, "three", t0());

        let visible = queue.visible(t0());
        let messages: Vec<_> = visible.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn expired_toasts_disappear() {
        let mut queue = ToastQueue::default();
        queue.push(ToastKind::Success, "saved", t0());
        assert_eq!(queue.visible(t0() + Duration::milliseconds(1999)).len(), 1);
        assert!(queue.visible(t0() + Duration::milliseconds(2000)).is_empty());
    }

    #[test]
    fn dismiss_removes_by_id() {
        let mut queue = ToastQueue::default();
        let first = queue.push(ToastKind::Info, "a", t0());
        queue.push(ToastKind::Info, "b", t0());
        queue.dismiss(first);
        let visible = queue.visible(t0());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "b");
    }
}
