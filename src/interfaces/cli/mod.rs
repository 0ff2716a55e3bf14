//! CLI interface module
//!
//! 账号管理与配置生成，直接访问数据库，不经过 HTTP。

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands, UserCommands};
use crate::errors::SiteError;
use crate::services::AuthService;
use crate::storage::StorageFactory;

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<SiteError> for CliError {
    fn from(err: SiteError) -> Self {
        match err {
            SiteError::Validation(msg) => CliError::ParseError(msg),
            SiteError::DatabaseConfig(_)
            | SiteError::DatabaseConnection(_)
            | SiteError::DatabaseOperation(_) => CliError::StorageError(err.message().to_string()),
            other => CliError::CommandError(other.format_simple()),
        }
    }
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` 由 runtime 处理，这里不会收到
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Serve => Err(CliError::CommandError(
            "serve is not a CLI command".to_string(),
        )),
        // Generate 不需要数据库连接
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => commands::config_generate(output_path, force),
        Commands::User { action } => {
            let storage = StorageFactory::create().await?;
            let auth = AuthService::new(storage.clone());
            let result = match action {
                UserCommands::Create {
                    email,
                    role,
                    name,
                    password,
                    stdin,
                } => commands::create_user(&auth, &email, role.into(), name, password, stdin).await,
                UserCommands::List { role } => {
                    commands::list_users(&auth, role.map(Into::into)).await
                }
            };
            storage.close().await;
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_error_conversion() {
        let e: CliError = SiteError::validation("bad email").into();
        assert!(matches!(e, CliError::ParseError(ref m) if m == "bad email"));

        let e: CliError = SiteError::database_operation("locked").into();
        assert!(matches!(e, CliError::StorageError(ref m) if m == "locked"));

        let e: CliError = SiteError::not_found("nope").into();
        assert!(matches!(e, CliError::CommandError(_)));
    }

    #[test]
    fn test_format_simple() {
        let e = CliError::CommandError("boom".into());
        assert_eq!(e.format_simple(), "Command error: boom");
        assert_eq!(e.to_string(), "Command error: boom");
    }
}
