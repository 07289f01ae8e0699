pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod response;
pub mod router;
pub mod state;
pub mod validation;

pub use router::app;
pub use state::AppState;
