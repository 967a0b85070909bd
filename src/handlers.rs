use crate::engine::{self, Action, Transition};
use crate::errors::AppError;
use crate::models::{
    ActionResponse, AddHabitForm, AddHabitRequest, FilterMode, Habit, HabitId, HabitListResponse,
    ITEMS_PER_PAGE, ListQuery, Preferences, PreferencesUpdate,
};
use crate::state::AppState;
use crate::toast::Toast;
use crate::ui::{IndexView, render_index};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use chrono::Utc;
use uuid::Uuid;

pub async fn index(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Html<String> {
    let mut session = state.session.lock().await;
    let list = page_view(session.habits(), query.filter, query.page);
    let pending_delete = session
        .pending_delete
        .pending()
        .and_then(|id| session.habits().iter().find(|habit| habit.id == *id))
        .map(|habit| habit.name.clone());
    let pending_reset = session.pending_reset.is_pending();
    let preferences = session.data.preferences.clone();
    let toasts = session.toasts.visible(Utc::now());

    Html(render_index(&IndexView {
        list: &list,
        preferences: &preferences,
        toasts: &toasts,
        pending_delete: pending_delete.as_deref(),
        pending_reset,
    }))
}

pub async fn add_habit_form(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Form(form): Form<AddHabitForm>,
) -> Result<Redirect, AppError> {
    let action = Action::Add {
        name: form.name,
        is_healthy: form.healthy.is_some(),
    };
    back_home(state.dispatch(action).await, &query)
}

pub async fn increment_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect, AppError> {
    back_home(state.dispatch(Action::Increment(HabitId::from_uuid(id))).await, &query)
}

pub async fn decrement_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect, AppError> {
    back_home(state.dispatch(Action::Decrement(HabitId::from_uuid(id))).await, &query)
}

pub async fn increment_all_form(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect, AppError> {
    back_home(state.dispatch(Action::IncrementAll).await, &query)
}

pub async fn request_delete_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Redirect {
    state.request_delete(HabitId::from_uuid(id)).await;
    Redirect::to(&query.home_url())
}

pub async fn confirm_delete_form(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect, AppError> {
    back_home(state.confirm_delete().await, &query)
}

pub async fn cancel_delete_form(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Redirect {
    state.cancel_delete().await;
    Redirect::to(&query.home_url())
}

pub async fn request_reset_form(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Redirect {
    state.request_reset().await;
    Redirect::to(&query.home_url())
}

pub async fn confirm_reset_form(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect, AppError> {
    back_home(state.confirm_reset().await, &query)
}

pub async fn cancel_reset_form(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Redirect {
    state.cancel_reset().await;
    Redirect::to(&query.home_url())
}

pub async fn dismiss_toast_form(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<ListQuery>,
) -> Redirect {
    state.dismiss_toast(id).await;
    Redirect::to(&query.home_url())
}

pub async fn toggle_language(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect, AppError> {
    state
        .update_preferences(|prefs| prefs.language = prefs.language.toggled())
        .await?;
    Ok(Redirect::to(&query.home_url()))
}

pub async fn toggle_theme(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Result<Redirect, AppError> {
    state
        .update_preferences(|prefs| prefs.theme = prefs.theme.toggled())
        .await?;
    Ok(Redirect::to(&query.home_url()))
}

pub async fn toggle_reminders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Redirect, AppError> {
    state
        .update_preferences(|prefs| prefs.reminders_enabled = !prefs.reminders_enabled)
        .await?;
    Ok(Redirect::to(&query.home_url()))
}

pub async fn list_habits(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<HabitListResponse> {
    let session = state.session.lock().await;
    Json(page_view(session.habits(), query.filter, query.page))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<AddHabitRequest>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let is_healthy = match payload.is_healthy {
        Some(value) => value,
        None => state.preferences().await.default_healthy,
    };
    let transition = state
        .dispatch(Action::Add {
            name: payload.name,
            is_healthy,
        })
        .await?;
    Ok((StatusCode::CREATED, respond(transition)?))
}

pub async fn increment_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    respond(state.dispatch(Action::Increment(HabitId::from_uuid(id))).await?)
}

pub async fn decrement_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    respond(state.dispatch(Action::Decrement(HabitId::from_uuid(id))).await?)
}

/// API clients confirm on their side; this is the confirmed removal.
pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    respond(state.dispatch(Action::Remove(HabitId::from_uuid(id))).await?)
}

pub async fn increment_all(State(state): State<AppState>) -> Result<Json<ActionResponse>, AppError> {
    respond(state.dispatch(Action::IncrementAll).await?)
}

pub async fn reset_habits(State(state): State<AppState>) -> Result<Json<ActionResponse>, AppError> {
    respond(state.dispatch(Action::ResetAll).await?)
}

pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences().await)
}

pub async fn put_preferences(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> Result<Json<Preferences>, AppError> {
    let prefs = state
        .update_preferences(|prefs| {
            if let Some(language) = update.language {
                prefs.language = language;
            }
            if let Some(theme) = update.theme {
                prefs.theme = theme;
            }
            if let Some(enabled) = update.reminders_enabled {
                prefs.reminders_enabled = enabled;
            }
            if let Some(healthy) = update.default_healthy {
                prefs.default_healthy = healthy;
            }
        })
        .await?;
    Ok(Json(prefs))
}

pub async fn get_toasts(State(state): State<AppState>) -> Json<Vec<Toast>> {
    let mut session = state.session.lock().await;
    Json(session.toasts.visible(Utc::now()))
}

pub async fn dismiss_toast(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    state.dismiss_toast(id).await;
    StatusCode::NO_CONTENT
}

fn page_view(habits: &[Habit], filter: FilterMode, page: Option<usize>) -> HabitListResponse {
    let filtered = engine::filter(habits, filter);
    let total_pages = engine::total_pages(filtered.len(), ITEMS_PER_PAGE);
    let page = engine::clamp_page(page.unwrap_or(1), total_pages);
    let slice = engine::paginate(&filtered, ITEMS_PER_PAGE, page);
    HabitListResponse {
        habits: slice.items,
        filter,
        page: slice.page,
        total_pages: slice.total_pages,
        total: filtered.len(),
    }
}

fn respond(transition: Transition) -> Result<Json<ActionResponse>, AppError> {
    if let Some(error) = transition.rejection() {
        return Err(error.clone().into());
    }
    Ok(Json(ActionResponse {
        habits: transition.habits,
        event: transition.event,
    }))
}

/// Form posts always land back on the page. Row-store failures were already
/// queued as a toast, so they redirect too.
fn back_home<T>(result: Result<T, AppError>, query: &ListQuery) -> Result<Redirect, AppError> {
    match result {
        Ok(_) => Ok(Redirect::to(&query.home_url())),
        Err(err) if err.status == StatusCode::BAD_GATEWAY => Ok(Redirect::to(&query.home_url())),
        Err(err) => Err(err),
    }
}
