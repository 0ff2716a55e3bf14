pub mod auth;
pub mod collect;
pub mod content;
pub mod error_code;
pub mod health;
pub mod helpers;
pub mod public;
pub mod routes;
pub mod setup;
pub mod stats;
pub mod theme;
pub mod types;

pub use error_code::ErrorCode;
pub use health::{AppStartTime, health_routes};
pub use routes::{admin_routes, api_routes};
