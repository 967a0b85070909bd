use crate::models::{FilterMode, Habit, HabitListResponse, MAX_HABITS, Milestone, Preferences, Theme};
use crate::toast::{Toast, ToastKind};
use std::fmt::Write;

pub struct IndexView<'a> {
    pub list: &'a HabitListResponse,
    pub preferences: &'a Preferences,
    pub toasts: &'a [Toast],
    /// Name of the habit awaiting delete confirmation.
    pub pending_delete: Option<&'a str>,
    pub pending_reset: bool,
}

pub fn render_index(view: &IndexView<'_>) -> String {
    let prefs = view.preferences;
    let dir = if prefs.language.is_rtl() { "rtl" } else { "ltr" };
    let query = list_query(view.list);

    INDEX_HTML
        .replace("{{QUERY}}", &query)
        .replace("{{LANG}}", prefs.language.code())
        .replace("{{DIR}}", dir)
        .replace("{{THEME}}", prefs.theme.as_str())
        .replace("{{THEME_TOGGLE}}", theme_toggle_label(prefs.theme))
        .replace("{{REMINDERS}}", if prefs.reminders_enabled { "Reminders on" } else { "Reminders off" })
        .replace("{{HEALTHY_CHECKED}}", if prefs.default_healthy { "checked" } else { "" })
        .replace("{{MAX_NAME}}", &crate::models::MAX_NAME_CHARS.to_string())
        .replace("{{COUNT}}", &format!("{}/{}", view.list.total, MAX_HABITS))
        .replace("{{FILTERS}}", &render_filters(view.list.filter))
        .replace("{{HABITS}}", &render_habits(view.list, &query))
        .replace("{{PAGER}}", &render_pager(view.list))
        .replace("{{TOASTS}}", &render_toasts(view.toasts, &query))
        .replace("{{DIALOG}}", &render_dialog(view, &query))
}

/// Query string appended to form actions so redirects land on the same view.
fn list_query(list: &HabitListResponse) -> String {
    format!("?filter={}&amp;page={}", list.filter.as_str(), list.page)
}

fn theme_toggle_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "Dark mode",
        Theme::Dark => "Light mode",
    }
}

fn render_filters(active: FilterMode) -> String {
    let mut out = String::new();
    for mode in [FilterMode::All, FilterMode::Healthy, FilterMode::Unhealthy] {
        let class = if mode == active { "filter active" } else { "filter" };
        let _ = write!(
            out,
            r#"<a class="{class}" href="/?filter={0}">{0}</a>"#,
            mode.as_str()
        );
    }
    out
}

fn render_habits(list: &HabitListResponse, query: &str) -> String {
    if list.habits.is_empty() {
        return r#"<p class="empty">No habits added yet. Start by adding a new habit!</p>"#.to_string();
    }

    let mut out = String::new();
    for habit in &list.habits {
        let _ = write!(
            out,
            r#"<article class="habit {kind}">
  <h2>{name}</h2>
  <p class="count"><span>{label}</span> <strong>{days}</strong></p>
  <progress max="{goal}" value="{progress}"></progress>
  <div class="row">
    <form method="post" action="/habits/{id}/decrement{query}"><button type="submit">-1</button></form>
    <form method="post" action="/habits/{id}/increment{query}"><button type="submit">+1</button></form>
    <form method="post" action="/habits/{id}/delete{query}"><button class="danger" type="submit">Remove</button></form>
  </div>
</article>
"#,
            kind = if habit.is_healthy { "healthy" } else { "unhealthy" },
            name = escape_html(&habit.name),
            label = count_label(habit),
            days = habit.days_count,
            goal = Milestone::Month.days(),
            progress = habit.days_count.min(Milestone::Month.days()),
            id = habit.id,
        );
    }
    out
}

fn count_label(habit: &Habit) -> &'static str {
    if habit.is_healthy { "Streak:" } else { "Days without:" }
}

fn render_pager(list: &HabitListResponse) -> String {
    if list.total_pages <= 1 {
        return String::new();
    }
    let filter = list.filter.as_str();
    let prev = list.page.saturating_sub(1).max(1);
    let next = (list.page + 1).min(list.total_pages);
    format!(
        r#"<nav class="pager"><a href="/?filter={filter}&page={prev}">Previous</a><span>{page} / {total}</span><a href="/?filter={filter}&page={next}">Next</a></nav>"#,
        page = list.page,
        total = list.total_pages,
    )
}

fn render_toasts(toasts: &[Toast], query: &str) -> String {
    let mut out = String::new();
    for toast in toasts {
        let kind = match toast.kind {
            ToastKind::Success => "success",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
        };
        let _ = write!(
            out,
            r#"<div class="toast {kind}" role="status">{message}<form method="post" action="/toasts/{id}/dismiss{query}"><button type="submit" aria-label="Dismiss">&times;</button></form></div>"#,
            message = escape_html(&toast.message),
            id = toast.id,
        );
    }
    out
}

fn render_dialog(view: &IndexView<'_>, query: &str) -> String {
    let (title, body, confirm, cancel) = if let Some(name) = view.pending_delete {
        (
            "Are you sure?".to_string(),
            format!(
                "This will permanently delete \"{}\". This action cannot be undone.",
                escape_html(name)
            ),
            "/confirm/delete",
            "/cancel/delete",
        )
    } else if view.pending_reset {
        (
            "Reset All Habits".to_string(),
            "This will delete all your habits. Are you sure you want to continue?".to_string(),
            "/confirm/reset",
            "/cancel/reset",
        )
    } else {
        return String::new();
    };

    format!(
        r#"<div class="dialog" role="alertdialog">
  <h2>{title}</h2>
  <p>{body}</p>
  <div class="row">
    <form method="post" action="{cancel}{query}"><button type="submit">Cancel</button></form>
    <form method="post" action="{confirm}{query}"><button class="danger" type="submit">Confirm</button></form>
  </div>
</div>"#
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="{{LANG}}" dir="{{DIR}}" class="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root { --bg: #f4f1ea; --card: #ffffff; --ink: #22211f; --muted: #6b6760; --good: #2f7d5b; --bad: #b5533c; }
    .dark { --bg: #1c1d21; --card: #2a2c31; --ink: #f1efe9; --muted: #a19d95; }
    * { box-sizing: border-box; }
    body { margin: 0; background: var(--bg); color: var(--ink); font-family: "Trebuchet MS", sans-serif; }
    [dir="rtl"] body { font-family: "Noto Kufi Arabic", sans-serif; }
    main { width: min(720px, 100%); margin: 0 auto; padding: 32px 18px; display: grid; gap: 20px; }
    header, .row, .pager, .filters { display: flex; gap: 10px; align-items: center; flex-wrap: wrap; }
    header h1 { flex: 1; margin: 0; }
    .habit, .dialog { background: var(--card); border-radius: 14px; padding: 16px; }
    .habit.healthy { border-inline-start: 6px solid var(--good); }
    .habit.unhealthy { border-inline-start: 6px solid var(--bad); }
    .habit h2 { margin: 0 0 8px; font-size: 1.2rem; }
    .count span, .empty, .meta { color: var(--muted); }
    .filter { padding: 4px 10px; border-radius: 999px; color: var(--ink); text-decoration: none; }
    .filter.active { background: var(--card); font-weight: 600; }
    button { border: 0; border-radius: 8px; padding: 8px 12px; cursor: pointer; }
    .danger { background: var(--bad); color: #fff; }
    .toasts { position: fixed; top: 16px; inset-inline-end: 16px; display: grid; gap: 8px; }
    .toast { padding: 10px 14px; border-radius: 10px; background: var(--card); box-shadow: 0 6px 20px rgba(0,0,0,.15); }
    .toast.success { border-inline-start: 4px solid var(--good); }
    .toast.warning { border-inline-start: 4px solid var(--bad); }
    .dialog { border: 2px solid var(--bad); }
    .habit progress { width: 100%; accent-color: var(--good); }
    .habit.unhealthy progress { accent-color: var(--bad); }
    .toast form { display: inline; margin-inline-start: 8px; }
  </style>
</head>
<body>
  <div class="toasts">{{TOASTS}}</div>
  <main>
    <header>
      <h1>Habit Tracker</h1>
      <form method="post" action="/preferences/language{{QUERY}}"><button type="submit">{{LANG}}</button></form>
      <form method="post" action="/preferences/theme{{QUERY}}"><button type="submit">{{THEME_TOGGLE}}</button></form>
      <form method="post" action="/preferences/reminders{{QUERY}}"><button type="submit">{{REMINDERS}}</button></form>
    </header>
    {{DIALOG}}
    <form class="row" method="post" action="/habits{{QUERY}}">
      <input name="name" placeholder="Enter a new habit" maxlength="{{MAX_NAME}}" required />
      <label><input type="checkbox" name="healthy" {{HEALTHY_CHECKED}} /> Healthy</label>
      <button type="submit">Add Habit</button>
    </form>
    <div class="filters">{{FILTERS}}<span class="meta">{{COUNT}}</span></div>
    {{HABITS}}
    {{PAGER}}
    <div class="row">
      <form method="post" action="/habits/increment-all{{QUERY}}"><button type="submit">Increase all</button></form>
      <form method="post" action="/habits/reset{{QUERY}}"><button class="danger" type="submit">Reset All</button></form>
    </div>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine;
    use crate::models::Language;
    use chrono::Utc;

    fn list_of(habits: Vec<Habit>) -> HabitListResponse {
        HabitListResponse {
            total: habits.len(),
            habits,
            filter: FilterMode::All,
            page: 1,
            total_pages: 1,
        }
    }

    #[test]
    fn escapes_habit_names() {
        let habits = engine::add(&[], "<script>", false, Utc::now()).habits;
        let list = list_of(habits);
        let prefs = Preferences::default();
        let html = render_index(&IndexView {
            list: &list,
            preferences: &prefs,
            toasts: &[],
            pending_delete: None,
            pending_reset: false,
        });
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<h2><script>"));
        assert!(html.contains("Days without:"));
    }

    #[test]
    fn arabic_renders_right_to_left() {
        let list = list_of(Vec::new());
        let prefs = Preferences {
            language: Language::Ar,
            ..Preferences::default()
        };
        let html = render_index(&IndexView {
            list: &list,
            preferences: &prefs,
            toasts: &[],
            pending_delete: None,
            pending_reset: true,
        });
        assert!(html.contains(r#"dir="rtl""#));
        assert!(html.contains("/confirm/reset"));
        assert!(html.contains("No habits added yet"));
    }

    #[test]
    fn progress_caps_at_one_month() {
        let now = Utc::now();
        let mut habits = engine::add(&[], "Walk", true, now).habits;
        habits[0].days_count = 45;
        let list = list_of(habits);
        let html = render_habits(&list, &list_query(&list));
        assert!(html.contains(r#"<progress max="30" value="30"></progress>"#));
    }

    #[test]
    fn form_actions_keep_the_current_view() {
        let habits = engine::add(&[], "Walk", true, Utc::now()).habits;
        let mut list = list_of(habits);
        list.filter = FilterMode::Healthy;
        let prefs = Preferences::default();
        let toasts = [Toast {
            id: 7,
            kind: ToastKind::Info,
            message: "hi".to_string(),
            created_at: Utc::now(),
        }];
        let html = render_index(&IndexView {
            list: &list,
            preferences: &prefs,
            toasts: &toasts,
            pending_delete: Some("Walk"),
            pending_reset: false,
        });
        let query = "?filter=healthy&amp;page=1";
        assert!(html.contains(&format!(r#"action="/habits{query}""#)));
        assert!(html.contains(&format!(r#"increment{query}""#)));
        assert!(html.contains(&format!(r#"action="/confirm/delete{query}""#)));
        assert!(html.contains(&format!(r#"action="/preferences/theme{query}""#)));
        assert!(html.contains(&format!(r#"action="/toasts/7/dismiss{query}""#)));
        assert!(!html.contains("{{QUERY}}"));
    }
}
