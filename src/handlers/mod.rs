mod auth;
mod contact;
mod health;
mod metrics;
mod profile;
mod services;

pub use auth::{login_handler, logout_handler};
pub use contact::contact_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use profile::{get_profile_handler, update_profile_handler};
pub use services::{SERVICES, list_services_handler};
