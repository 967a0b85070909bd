use crate::errors::ValidationError;
use crate::models::{FilterMode, Habit, HabitId, MAX_HABITS, MAX_NAME_CHARS, Milestone, MilestoneMarks};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HabitEvent {
    Added { id: HabitId, name: String },
    Removed { id: HabitId },
    Reset,
    Milestone { id: HabitId, name: String, milestone: Milestone },
    AllIncremented { count: usize },
    Rejected { error: ValidationError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub habits: Vec<Habit>,
    pub event: Option<HabitEvent>,
}

impl Transition {
    fn unchanged(list: &[Habit]) -> Self {
        Self {
            habits: list.to_vec(),
            event: None,
        }
    }

    fn rejected(list: &[Habit], error: ValidationError) -> Self {
        Self {
            habits: list.to_vec(),
            event: Some(HabitEvent::Rejected { error }),
        }
    }

    pub fn rejection(&self) -> Option<&ValidationError> {
        match &self.event {
            Some(HabitEvent::Rejected { error }) => Some(error),
            _ => None,
        }
    }
}

/// A user action against the habit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { name: String, is_healthy: bool },
    Remove(HabitId),
    ResetAll,
    Increment(HabitId),
    Decrement(HabitId),
    IncrementAll,
}

pub fn apply(list: &[Habit], action: &Action, now: DateTime<Utc>) -> Transition {
    match action {
        Action::Add { name, is_healthy } => add(list, name, *is_healthy, now),
        Action::Remove(id) => remove(list, *id),
        Action::ResetAll => reset_all(list),
        Action::Increment(id) => increment(list, *id, now),
        Action::Decrement(id) => decrement(list, *id),
        Action::IncrementAll => increment_all(list),
    }
}

pub fn add(list: &[Habit], name: &str, is_healthy: bool, now: DateTime<Utc>) -> Transition {
    if list.len() >= MAX_HABITS {
        return Transition::rejected(list, ValidationError::CapacityExceeded { limit: MAX_HABITS });
    }

    let name = normalize_name(name);
    if name.is_empty() {
        return Transition::rejected(list, ValidationError::EmptyName);
    }

    let habit = Habit {
        id: HabitId::new(),
        name: name.clone(),
        is_healthy,
        days_count: 0,
        creation_date: now,
        milestone_marks: MilestoneMarks::default(),
    };
    let id = habit.id;

    let mut habits = list.to_vec();
    habits.push(habit);
    Transition {
        habits,
        event: Some(HabitEvent::Added { id, name }),
    }
}

pub fn remove(list: &[Habit], id: HabitId) -> Transition {
    if !list.iter().any(|habit| habit.id == id) {
        return Transition::unchanged(list);
    }

    Transition {
        habits: list.iter().filter(|habit| habit.id != id).cloned().collect(),
        event: Some(HabitEvent::Removed { id }),
    }
}

pub fn reset_all(_list: &[Habit]) -> Transition {
    Transition {
        habits: Vec::new(),
        event: Some(HabitEvent::Reset),
    }
}

pub fn increment(list: &[Habit], id: HabitId, now: DateTime<Utc>) -> Transition {
    let Some(index) = list.iter().position(|habit| habit.id == id) else {
        return Transition::unchanged(list);
    };

    let mut habits = list.to_vec();
    let habit = &mut habits[index];
    habit.days_count = habit.days_count.saturating_add(1);

    // Thresholds are distinct, so at most one milestone can match.
    let event = Milestone::for_days(habit.days_count)
        .filter(|milestone| cooldown_elapsed(&habit.milestone_marks, *milestone, now))
        .map(|milestone| {
            habit.milestone_marks.set(milestone, now);
            HabitEvent::Milestone {
                id,
                name: habit.name.clone(),
                milestone,
            }
        });

    Transition { habits, event }
}

pub fn decrement(list: &[Habit], id: HabitId) -> Transition {
    let mut habits = list.to_vec();
    if let Some(habit) = habits.iter_mut().find(|habit| habit.id == id) {
        habit.days_count = habit.days_count.saturating_sub(1);
    }
    Transition { habits, event: None }
}

/// Bulk path: no milestone evaluation.
pub fn increment_all(list: &[Habit]) -> Transition {
    let habits: Vec<Habit> = list
        .iter()
        .cloned()
        .map(|mut habit| {
            habit.days_count = habit.days_count.saturating_add(1);
            habit
        })
        .collect();
    let count = habits.len();
    Transition {
        habits,
        event: Some(HabitEvent::AllIncremented { count }),
    }
}

pub fn filter(list: &[Habit], mode: FilterMode) -> Vec<Habit> {
    list.iter()
        .filter(|habit| match mode {
            FilterMode::All => true,
            FilterMode::Healthy => habit.is_healthy,
            FilterMode::Unhealthy => !habit.is_healthy,
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Habit>,
    pub page: usize,
    pub total_pages: usize,
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Plain contiguous slice; callers clamp `page` with [`clamp_page`] first.
pub fn paginate(list: &[Habit], page_size: usize, page: usize) -> Page {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(list.len());
    let end = start.saturating_add(page_size).min(list.len());
    Page {
        items: list[start..end].to_vec(),
        page,
        total_pages: total_pages(list.len(), page_size),
    }
}

fn normalize_name(name: &str) -> String {
    let truncated: String = name.trim().chars().take(MAX_NAME_CHARS).collect();
    truncated.trim_end().to_string()
}

fn cooldown_elapsed(marks: &MilestoneMarks, milestone: Milestone, now: DateTime<Utc>) -> bool {
    match marks.get(milestone) {
        None => true,
        Some(last) => now - last > milestone.period(),
    }
}
