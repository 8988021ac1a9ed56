//! Veriframe HTTP API - upload endpoints over the analysis pipeline

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, serve, ServerConfig};
pub use state::AppState;
