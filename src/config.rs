use crate::models::UserId;
use std::{env, path::PathBuf, time::Duration};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/habits.json";
const DEFAULT_USER: &str = "local";
const DEFAULT_REMINDER_SECS: u64 = 60 * 60;

/// Where habit rows live. Preferences always stay in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub backend: BackendKind,
    pub user: UserId,
    pub reminder_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let backend = match lookup("HABITS_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("file") => BackendKind::File,
            Some("memory") => BackendKind::Memory,
            Some(other) => {
                warn!("unknown HABITS_BACKEND {other:?}, using file");
                BackendKind::File
            }
        };

        let user = lookup("HABITS_USER")
            .filter(|value| !value.trim().is_empty())
            .map(UserId::new)
            .unwrap_or_else(|| UserId::new(DEFAULT_USER));

        let reminder_secs = lookup("REMINDER_INTERVAL_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REMINDER_SECS);

        Self {
            port,
            data_path,
            backend,
            user,
            reminder_interval: Duration::from_secs(reminder_secs),
        }
    }
}
