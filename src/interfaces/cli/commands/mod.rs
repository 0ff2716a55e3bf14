//! CLI command implementations

mod config_gen;
mod user;

pub use config_gen::config_generate;
pub use user::{create_user, list_users};
