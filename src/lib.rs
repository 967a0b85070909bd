pub mod app;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reminder;
pub mod remote;
pub mod state;
pub mod storage;
pub mod toast;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
