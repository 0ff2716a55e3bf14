//! Mode routing
//!
//! - Server mode (HTTP server)
//! - CLI mode (account and config management)

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq)]
pub enum Mode {
    #[cfg(feature = "server")]
    Server,
    #[cfg(feature = "cli")]
    Cli,
    Unknown,
}

/// 根据子命令选择运行模式
///
/// 没有子命令或 `serve` 时启动服务器，其余交给 CLI
pub fn detect_mode(command: Option<&Commands>) -> Mode {
    #[cfg(feature = "cli")]
    if let Some(cmd) = command
        && !matches!(cmd, Commands::Serve)
    {
        return Mode::Cli;
    }

    #[cfg(feature = "server")]
    return Mode::Server;

    #[cfg(not(feature = "server"))]
    {
        let _ = command;
        Mode::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigCommands;

    #[test]
    fn test_detect_mode() {
        assert_eq!(detect_mode(None), Mode::Server);
        assert_eq!(detect_mode(Some(&Commands::Serve)), Mode::Server);
        let generate = Commands::Config {
            action: ConfigCommands::Generate {
                output_path: None,
                force: false,
            },
        };
        assert_eq!(detect_mode(Some(&generate)), Mode::Cli);
    }
}
