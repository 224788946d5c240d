pub mod app;
pub mod calculator;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;
pub mod views;

pub use app::router;
pub use config::ServerConfig;
pub use session::Session;
pub use state::AppState;
pub use storage::{load_session, persist_session};
