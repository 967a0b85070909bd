use crate::engine::{self, Action, Transition};
use crate::errors::RemoteError;
use crate::models::{Habit, HabitId, UserId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub trait RowStore: Send + Sync {
    fn fetch_all(&self, user: &UserId) -> impl Future<Output = Result<Vec<Habit>, RemoteError>> + Send;

    fn insert(&self, user: &UserId, habit: &Habit) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn update(&self, user: &UserId, habit: &Habit) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete(&self, user: &UserId, id: HabitId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete_all(&self, user: &UserId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Adds one day to every row owned by `user` in a single operation.
    fn increment_all(&self, user: &UserId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// In-process row store. Rows live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    rows: Mutex<HashMap<UserId, Vec<Habit>>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowStore for MemoryRowStore {
    async fn fetch_all(&self, user: &UserId) -> Result<Vec<Habit>, RemoteError> {
        let rows = self.rows.lock().await;
        Ok(rows.get(user).cloned().unwrap_or_default())
    }

    async fn insert(&self, user: &UserId, habit: &Habit) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().await;
        let owned = rows.entry(user.clone()).or_default();
        if owned.iter().any(|row| row.id == habit.id) {
            return Err(RemoteError::Rejected(format!("duplicate habit id {}", habit.id)));
        }
        owned.push(habit.clone());
        Ok(())
    }

    async fn update(&self, user: &UserId, habit: &Habit) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .get_mut(user)
            .and_then(|owned| owned.iter_mut().find(|row| row.id == habit.id))
            .ok_or(RemoteError::NotFound(habit.id))?;
        *row = habit.clone();
        Ok(())
    }

    async fn delete(&self, user: &UserId, id: HabitId) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().await;
        let owned = rows.get_mut(user).ok_or(RemoteError::NotFound(id))?;
        let before = owned.len();
        owned.retain(|row| row.id != id);
        if owned.len() == before {
            return Err(RemoteError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_all(&self, user: &UserId) -> Result<(), RemoteError> {
        self.rows.lock().await.remove(user);
        Ok(())
    }

    async fn increment_all(&self, user: &UserId) -> Result<(), RemoteError> {
        let mut rows = self.rows.lock().await;
        if let Some(owned) = rows.get_mut(user) {
            for row in owned.iter_mut() {
                row.days_count = row.days_count.saturating_add(1);
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct RemoteHabits<S> {
    store: Arc<S>,
    user: UserId,
    habits: Vec<Habit>,
}

impl<S: RowStore> RemoteHabits<S> {
    pub async fn load(store: Arc<S>, user: UserId) -> Result<Self, RemoteError> {
        let habits = store.fetch_all(&user).await?;
        debug!(user = %user, count = habits.len(), "loaded habits from row store");
        Ok(Self { store, user, habits })
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub async fn refresh(&mut self) -> Result<(), RemoteError> {
        self.habits = self.store.fetch_all(&self.user).await?;
        Ok(())
    }

    /// Runs `action` through the engine, writes the change to the store and
    /// adopts the new list once the write succeeds.
    pub async fn dispatch(&mut self, action: &Action, now: DateTime<Utc>) -> Result<Transition, RemoteError> {
        let transition = engine::apply(&self.habits, action, now);
        if transition.rejection().is_some() || transition.habits == self.habits {
            return Ok(transition);
        }

        let result = match action {
            Action::Add { .. } => match transition.habits.last() {
                Some(habit) => self.store.insert(&self.user, habit).await,
                None => Ok(()),
            },
            Action::Remove(id) => self.store.delete(&self.user, *id).await,
            Action::ResetAll => self.store.delete_all(&self.user).await,
            Action::Increment(id) | Action::Decrement(id) => {
                match transition.habits.iter().find(|habit| habit.id == *id) {
                    Some(habit) => self.store.update(&self.user, habit).await,
                    None => Ok(()),
                }
            }
            Action::IncrementAll => self.store.increment_all(&self.user).await,
        };

        if let Err(err) = result {
            warn!(user = %self.user, ?action, "row store write failed: {err}");
            // The cache holds a row the store no longer has; resync it.
            if matches!(err, RemoteError::NotFound(_)) {
                if let Err(refresh_err) = self.refresh().await {
                    warn!(user = %self.user, "row store refresh failed: {refresh_err}");
                }
            }
            return Err(err);
        }

        self.habits = transition.habits.clone();
        Ok(transition)
    }
}
