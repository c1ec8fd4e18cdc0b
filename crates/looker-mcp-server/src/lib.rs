pub mod commands;
pub mod configuration;
pub mod logging;
pub mod openapi;
pub mod routes;
pub mod signal;
pub mod state;

pub use state::AppState;
