pub mod app;
pub mod classify;
pub mod config;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod stats;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use store::SessionStore;
