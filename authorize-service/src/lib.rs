pub mod app;
pub mod authorize_handlers;
pub mod config;

pub use app::{build_router, AppState};
pub use config::{load_service_config, ServiceConfig};
