use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/habits", post(handlers::add_habit_form))
        .route("/habits/increment-all", post(handlers::increment_all_form))
        .route("/habits/reset", post(handlers::request_reset_form))
        .route("/habits/:id/increment", post(handlers::increment_form))
        .route("/habits/:id/decrement", post(handlers::decrement_form))
        .route("/habits/:id/delete", post(handlers::request_delete_form))
        .route("/confirm/delete", post(handlers::confirm_delete_form))
        .route("/cancel/delete", post(handlers::cancel_delete_form))
        .route("/confirm/reset", post(handlers::confirm_reset_form))
        .route("/cancel/reset", post(handlers::cancel_reset_form))
        .route("/preferences/language", post(handlers::toggle_language))
        .route("/preferences/theme", post(handlers::toggle_theme))
        .route("/preferences/reminders", post(handlers::toggle_reminders))
        .route("/toasts/:id/dismiss", post(handlers::dismiss_toast_form))
        .route(
            "/api/habits",
            get(handlers::list_habits)
                .post(handlers::create_habit)
                .delete(handlers::reset_habits),
        )
        .route("/api/habits/increment-all", post(handlers::increment_all))
        .route("/api/habits/:id", delete(handlers::delete_habit))
        .route("/api/habits/:id/increment", post(handlers::increment_habit))
        .route("/api/habits/:id/decrement", post(handlers::decrement_habit))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).put(handlers::put_preferences),
        )
        .route("/api/toasts", get(handlers::get_toasts))
        .route("/api/toasts/:id", delete(handlers::dismiss_toast))
        .with_state(state)
}
