use crate::state::AppState;
use crate::toast::ToastKind;
use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const REMINDER_MESSAGE: &str = "Time to check your habits!";

/// Fires at most once per `interval`, and only while reminders are enabled.
#[derive(Debug)]
pub struct ReminderThrottle {
    interval: Duration,
    last_sent: Option<DateTime<Utc>>,
}

impl ReminderThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    pub fn should_fire(&mut self, enabled: bool, now: DateTime<Utc>) -> bool {
        if !enabled {
            return false;
        }
        if let Some(last) = self.last_sent {
            if now - last < self.interval {
                return false;
            }
        }
        self.last_sent = Some(now);
        true
    }
}

/// Checks the reminder flag every `check_every` and notifies when the
/// throttle allows. The handle is aborted on shutdown.
pub fn spawn_reminders(
    state: AppState,
    interval: std::time::Duration,
    check_every: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut throttle = ReminderThrottle::new(
            Duration::from_std(interval).unwrap_or_else(|_| Duration::hours(1)),
        );
        let mut ticker = tokio::time::interval(check_every);
        loop {
            ticker.tick().await;
            remind_once(&state, &mut throttle, Utc::now()).await;
        }
    })
}

pub async fn remind_once(state: &AppState, throttle: &mut ReminderThrottle, now: DateTime<Utc>) -> bool {
    let enabled = state.preferences().await.reminders_enabled;
    if !throttle.should_fire(enabled, now) {
        debug!(enabled, "reminder skipped");
        return false;
    }
    info!(target: "notification", "{REMINDER_MESSAGE}");
    state.push_toast(ToastKind::Info, REMINDER_MESSAGE).await;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppData;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn never_fires_when_disabled() {
        let mut throttle = ReminderThrottle::new(Duration::minutes(5));
        for minute in 0..20 {
            assert!(!throttle.should_fire(false, t0() + Duration::minutes(minute)));
        }
    }

    #[test]
    fn fires_once_per_interval() {
        let mut throttle = ReminderThrottle::new(Duration::minutes(5));
        let fired: Vec<i64> = (0..12)
            .filter(|minute| throttle.should_fire(true, t0() + Duration::minutes(*minute)))
            .collect();
        assert_eq!(fired, vec![0, 5, 10]);
    }

    #[tokio::test]
    async fn remind_once_follows_preference() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("habits.json"), AppData::default());
        let mut throttle = ReminderThrottle::new(Duration::hours(1));

        assert!(!remind_once(&state, &mut throttle, t0()).await);

        state
            .update_preferences(|prefs| prefs.reminders_enabled = true)
            .await
            .unwrap();
        assert!(remind_once(&state, &mut throttle, t0()).await);
        assert!(!remind_once(&state, &mut throttle, t0() + Duration::minutes(30)).await);
        assert_eq!(state.session.lock().await.toasts.len(), 1);
    }
}
