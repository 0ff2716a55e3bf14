//! Command-line interface definitions using clap
//!
//! 不带子命令时启动 HTTP 服务。

use clap::{Parser, Subcommand, ValueEnum};

use crate::api::signed_cookie::AccessRole;

/// lmsite - personal site backend with built-in analytics
#[derive(Parser)]
#[command(name = "lmsite")]
#[command(version)]
#[command(about = "Personal site backend with built-in analytics", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: ./config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Manage admin and private-viewer accounts
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Account management commands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    Create {
        /// Login email
        email: String,

        /// Account role
        #[arg(long, value_enum, default_value_t = RoleArg::Admin)]
        role: RoleArg,

        /// Display name shown in the admin panel
        #[arg(long)]
        name: Option<String>,

        /// Password (not recommended, visible in shell history)
        #[arg(long)]
        password: Option<String>,

        /// Read password from stdin (for scripting)
        #[arg(long)]
        stdin: bool,
    },

    /// List accounts
    List {
        /// Only show accounts with this role
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Private,
}

impl From<RoleArg> for AccessRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => AccessRole::Admin,
            RoleArg::Private => AccessRole::Private,
        }
    }
}
