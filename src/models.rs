use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const MAX_HABITS: usize = 10;
pub const MAX_NAME_CHARS: usize = 50;
pub const ITEMS_PER_PAGE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity owning a set of rows in the row store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Week,
    TwoWeeks,
    ThreeWeeks,
    Month,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::Week,
        Milestone::TwoWeeks,
        Milestone::ThreeWeeks,
        Milestone::Month,
    ];

    pub fn days(self) -> u32 {
        match self {
            Milestone::Week => 7,
            Milestone::TwoWeeks => 14,
            Milestone::ThreeWeeks => 21,
            Milestone::Month => 30,
        }
    }

    /// Cooldown before the same milestone may celebrate again.
    pub fn period(self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.days()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Milestone::Week => "one week",
            Milestone::TwoWeeks => "two weeks",
            Milestone::ThreeWeeks => "three weeks",
            Milestone::Month => "one month",
        }
    }

    pub fn for_days(days: u32) -> Option<Milestone> {
        Self::ALL.into_iter().find(|m| m.days() == days)
    }
}

/// Last time each milestone fired. `None` means never.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneMarks {
    pub week: Option<DateTime<Utc>>,
    pub two_weeks: Option<DateTime<Utc>>,
    pub three_weeks: Option<DateTime<Utc>>,
    pub month: Option<DateTime<Utc>>,
}

impl MilestoneMarks {
    pub fn get(&self, milestone: Milestone) -> Option<DateTime<Utc>> {
        match milestone {
            Milestone::Week => self.week,
            Milestone::TwoWeeks => self.two_weeks,
            Milestone::ThreeWeeks => self.three_weeks,
            Milestone::Month => self.month,
        }
    }

    pub fn set(&mut self, milestone: Milestone, at: DateTime<Utc>) {
        let slot = match milestone {
            Milestone::Week => &mut self.week,
            Milestone::TwoWeeks => &mut self.two_weeks,
            Milestone::ThreeWeeks => &mut self.three_weeks,
            Milestone::Month => &mut self.month,
        };
        *slot = Some(at);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub is_healthy: bool,
    pub days_count: u32,
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub milestone_marks: MilestoneMarks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Healthy,
    Unhealthy,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Healthy => "healthy",
            FilterMode::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub language: Language,
    pub theme: Theme,
    pub reminders_enabled: bool,
    pub default_healthy: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::En,
            theme: Theme::Light,
            reminders_enabled: false,
            default_healthy: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppData {
    pub habits: Vec<Habit>,
    pub preferences: Preferences,
}

#[derive(Debug, Deserialize)]
pub struct AddHabitRequest {
    pub name: String,
    pub is_healthy: Option<bool>,
}

/// Form body of the add form. Checkbox values arrive as `"on"` when ticked.
#[derive(Debug, Deserialize)]
pub struct AddHabitForm {
    pub name: String,
    pub healthy: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: FilterMode,
    pub page: Option<usize>,
}

impl ListQuery {
    /// Index URL that keeps the current filter and page.
    pub fn home_url(&self) -> String {
        match self.page {
            Some(page) => format!("/?filter={}&page={page}", self.filter.as_str()),
            None => format!("/?filter={}", self.filter.as_str()),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PreferencesUpdate {
    pub language: Option<Language>,
    pub theme: Option<Theme>,
    pub reminders_enabled: Option<bool>,
    pub default_healthy: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    pub habits: Vec<Habit>,
    pub filter: FilterMode,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub habits: Vec<Habit>,
    pub event: Option<crate::engine::HabitEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_lookup_matches_thresholds() {
        assert_eq!(Milestone::for_days(7), Some(Milestone::Week));
        assert_eq!(Milestone::for_days(14), Some(Milestone::TwoWeeks));
        assert_eq!(Milestone::for_days(21), Some(Milestone::ThreeWeeks));
        assert_eq!(Milestone::for_days(30), Some(Milestone::Month));
        assert_eq!(Milestone::for_days(8), None);
        assert_eq!(Milestone::for_days(0), None);
    }

    #[test]
    fn marks_only_touch_requested_slot() {
        let mut marks = MilestoneMarks::default();
        let at = Utc::now();
        marks.set(Milestone::ThreeWeeks, at);
        assert_eq!(marks.get(Milestone::ThreeWeeks), Some(at));
        assert_eq!(marks.get(Milestone::Week), None);
        assert_eq!(marks.get(Milestone::TwoWeeks), None);
        assert_eq!(marks.get(Milestone::Month), None);
    }

    #[test]
    fn preferences_fill_missing_fields_with_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.language, Language::En);
        assert!(prefs.default_healthy);
        assert!(!prefs.reminders_enabled);
    }
}
