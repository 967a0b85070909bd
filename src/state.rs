use crate::config::{BackendKind, Config};
use crate::confirm::Confirmation;
use crate::engine::{self, Action, Transition};
use crate::errors::{AppError, RemoteError};
use crate::models::{AppData, Habit, HabitId, Preferences};
use crate::remote::{MemoryRowStore, RemoteHabits, RowStore};
use crate::storage::{load_data, persist_data};
use crate::toast::{ToastKind, ToastQueue, toast_for};
use chrono::Utc;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct Session<S = MemoryRowStore> {
    /// Contents of the data file. Its habit list is authoritative only when
    /// no row store is attached.
    pub data: AppData,
    pub remote: Option<RemoteHabits<S>>,
    pub pending_delete: Confirmation<HabitId>,
    pub pending_reset: Confirmation<()>,
    pub toasts: ToastQueue,
}

impl<S: RowStore> Session<S> {
    pub fn habits(&self) -> &[Habit] {
        match &self.remote {
            Some(remote) => remote.habits(),
            None => &self.data.habits,
        }
    }
}

pub struct AppState<S = MemoryRowStore> {
    pub data_path: PathBuf,
    pub session: Arc<Mutex<Session<S>>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            data_path: self.data_path.clone(),
            session: Arc::clone(&self.session),
        }
    }
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self::build(data_path, data, None)
    }

    pub async fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let data = load_data(&config.data_path).await;
        match config.backend {
            BackendKind::File => Ok(Self::new(config.data_path.clone(), data)),
            BackendKind::Memory => {
                let store = Arc::new(MemoryRowStore::new());
                let remote = RemoteHabits::load(store, config.user.clone()).await?;
                Ok(Self::with_remote(config.data_path.clone(), data, remote))
            }
        }
    }
}

impl<S: RowStore> AppState<S> {
    pub fn with_remote(data_path: PathBuf, data: AppData, remote: RemoteHabits<S>) -> Self {
        Self::build(data_path, data, Some(remote))
    }

    fn build(data_path: PathBuf, data: AppData, remote: Option<RemoteHabits<S>>) -> Self {
        Self {
            data_path,
            session: Arc::new(Mutex::new(Session {
                data,
                remote,
                pending_delete: Confirmation::default(),
                pending_reset: Confirmation::default(),
                toasts: ToastQueue::default(),
            })),
        }
    }

    /// Runs one action through the engine and persists the result. Rejected
    /// input comes back as a transition carrying the rejection; a failed
    /// row-store write comes back as an error.
    pub async fn dispatch(&self, action: Action) -> Result<Transition, AppError> {
        let mut guard = self.session.lock().await;
        self.dispatch_locked(&mut guard, action).await
    }

    pub async fn request_delete(&self, id: HabitId) {
        self.session.lock().await.pending_delete.request(id);
    }

    pub async fn cancel_delete(&self) {
        self.session.lock().await.pending_delete.cancel();
    }

    /// Applies the pending delete, if one was requested.
    pub async fn confirm_delete(&self) -> Result<Option<Transition>, AppError> {
        let mut guard = self.session.lock().await;
        let pending = guard.pending_delete.confirm();
        match pending {
            Some(id) => self.dispatch_locked(&mut guard, Action::Remove(id)).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn request_reset(&self) {
        self.session.lock().await.pending_reset.request(());
    }

    pub async fn cancel_reset(&self) {
        self.session.lock().await.pending_reset.cancel();
    }

    pub async fn confirm_reset(&self) -> Result<Option<Transition>, AppError> {
        let mut guard = self.session.lock().await;
        let pending = guard.pending_reset.confirm();
        match pending {
            Some(()) => self.dispatch_locked(&mut guard, Action::ResetAll).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn preferences(&self) -> Preferences {
        self.session.lock().await.data.preferences.clone()
    }

    pub async fn update_preferences(&self, update: impl FnOnce(&mut Preferences)) -> Result<Preferences, AppError> {
        let mut guard = self.session.lock().await;
        let mut next = guard.data.clone();
        update(&mut next.preferences);
        persist_data(&self.data_path, &next).await?;
        guard.data = next;
        info!(preferences = ?guard.data.preferences, "preferences updated");
        Ok(guard.data.preferences.clone())
    }

    pub async fn push_toast(&self, kind: ToastKind, message: impl Into<String>) {
        self.session.lock().await.toasts.push(kind, message, Utc::now());
    }

    pub async fn dismiss_toast(&self, id: u64) {
        self.session.lock().await.toasts.dismiss(id);
    }

    async fn dispatch_locked(&self, session: &mut Session<S>, action: Action) -> Result<Transition, AppError> {
        let now = Utc::now();
        let transition = match session.remote.as_mut() {
            Some(remote) => match remote.dispatch(&action, now).await {
                Ok(transition) => transition,
                Err(err) => {
                    session.toasts.push(ToastKind::Warning, err.to_string(), now);
                    return Err(err.into());
                }
            },
            None => {
                let transition = engine::apply(&session.data.habits, &action, now);
                if transition.rejection().is_none() && transition.habits != session.data.habits {
                    let next = AppData {
                        habits: transition.habits.clone(),
                        preferences: session.data.preferences.clone(),
                    };
                    persist_data(&self.data_path, &next).await?;
                    session.data = next;
                }
                transition
            }
        };

        match &transition.event {
            Some(engine::HabitEvent::Rejected { error }) => warn!(?action, "rejected: {error}"),
            Some(event) => info!(?event, "habit action applied"),
            None => {}
        }
        if let Some(event) = &transition.event {
            let (kind, message) = toast_for(event);
            session.toasts.push(kind, message, now);
        }

        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HabitEvent;
    use crate::errors::RemoteError;
    use crate::models::UserId;
    use axum::http::StatusCode;

    /// Serves reads but refuses every write.
    struct DownStore;

    impl RowStore for DownStore {
        async fn fetch_all(&self, _user: &UserId) -> Result<Vec<Habit>, RemoteError> {
            Ok(Vec::new())
        }

        async fn insert(&self, _user: &UserId, _habit: &Habit) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("connection refused".to_string()))
        }

        async fn update(&self, _user: &UserId, _habit: &Habit) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _user: &UserId, _id: HabitId) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("connection refused".to_string()))
        }

        async fn delete_all(&self, _user: &UserId) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("connection refused".to_string()))
        }

        async fn increment_all(&self, _user: &UserId) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("connection refused".to_string()))
        }
    }

    fn add(name: &str) -> Action {
        Action::Add {
            name: name.to_string(),
            is_healthy: false,
        }
    }

    #[tokio::test]
    async fn file_backend_persists_each_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        let state = AppState::new(path.clone(), AppData::default());

        state.dispatch(add("Coffee")).await.unwrap();
        let on_disk = load_data(&path).await;
        assert_eq!(on_disk.habits.len(), 1);
        assert_eq!(on_disk.habits[0].name, "Coffee");
    }

    #[tokio::test]
    async fn rejected_action_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        let state = AppState::new(path.clone(), AppData::default());

        let transition = state.dispatch(add("   ")).await.unwrap();
        assert!(transition.rejection().is_some());
        assert!(!path.exists());

        let session = state.session.lock().await;
        assert_eq!(session.toasts.len(), 1);
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("habits.json"), AppData::default());
        state.dispatch(add("Snacks")).await.unwrap();
        let id = state.session.lock().await.habits()[0].id;

        assert!(state.confirm_delete().await.unwrap().is_none());

        state.request_delete(id).await;
        state.cancel_delete().await;
        assert!(state.confirm_delete().await.unwrap().is_none());
        assert_eq!(state.session.lock().await.habits().len(), 1);

        state.request_delete(id).await;
        let transition = state.confirm_delete().await.unwrap().unwrap();
        assert_eq!(transition.event, Some(HabitEvent::Removed { id }));
        assert!(state.session.lock().await.habits().is_empty());
    }

    #[tokio::test]
    async fn reset_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("habits.json"), AppData::default());
        state.dispatch(add("a")).await.unwrap();
        state.dispatch(add("b")).await.unwrap();

        state.request_reset().await;
        let transition = state.confirm_reset().await.unwrap().unwrap();
        assert_eq!(transition.event, Some(HabitEvent::Reset));
        assert!(state.session.lock().await.habits().is_empty());
        assert!(state.confirm_reset().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remote_backend_keeps_file_habits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        let remote = RemoteHabits::load(Arc::new(MemoryRowStore::new()), UserId::new("u"))
            .await
            .unwrap();
        let state = AppState::with_remote(path.clone(), AppData::default(), remote);

        state.dispatch(add("Gaming")).await.unwrap();
        assert_eq!(state.session.lock().await.habits().len(), 1);
        assert!(state.session.lock().await.data.habits.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn preferences_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        let state = AppState::new(path.clone(), AppData::default());

        let prefs = state
            .update_preferences(|prefs| prefs.language = prefs.language.toggled())
            .await
            .unwrap();
        assert!(prefs.language.is_rtl());
        assert!(load_data(&path).await.preferences.language.is_rtl());
    }

    #[tokio::test]
    async fn failed_store_write_warns_and_keeps_list() {
        let dir = tempfile::tempdir().unwrap();
        let remote = RemoteHabits::load(Arc::new(DownStore), UserId::new("u")).await.unwrap();
        let state = AppState::with_remote(dir.path().join("habits.json"), AppData::default(), remote);

        let err = state.dispatch(add("Gaming")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let mut session = state.session.lock().await;
        assert!(session.habits().is_empty());
        let toasts = session.toasts.visible(Utc::now());
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Warning);
    }

    #[tokio::test]
    async fn row_deleted_elsewhere_is_dropped_from_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryRowStore::new());
        let user = UserId::new("u");
        let remote = RemoteHabits::load(store.clone(), user.clone()).await.unwrap();
        let state = AppState::with_remote(dir.path().join("habits.json"), AppData::default(), remote);

        state.dispatch(add("Gaming")).await.unwrap();
        let id = state.session.lock().await.habits()[0].id;
        store.delete(&user, id).await.unwrap();

        let err = state.dispatch(Action::Increment(id)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(state.session.lock().await.habits().is_empty());

        let transition = state.dispatch(Action::Remove(id)).await.unwrap();
        assert!(transition.event.is_none());
    }

    #[tokio::test]
    async fn dismissed_toast_leaves_queue() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("habits.json"), AppData::default());
        state.push_toast(ToastKind::Info, "one").await;
        state.push_toast(ToastKind::Info, "two").await;

        let first = state.session.lock().await.toasts.visible(Utc::now())[0].id;
        state.dismiss_toast(first).await;

        let remaining = state.session.lock().await.toasts.visible(Utc::now());
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "two");
    }
}
