use habit_tracker::{AppState, Config, reminder, router};
use std::{net::SocketAddr, time::Duration};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let state = AppState::from_config(&config).await?;
    let check_every = config.reminder_interval.min(Duration::from_secs(60));
    let reminders = reminder::spawn_reminders(state.clone(), config.reminder_interval, check_every);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(backend = ?config.backend, user = %config.user, "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reminders.abort();
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
