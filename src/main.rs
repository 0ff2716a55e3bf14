use clap::Parser;

use lmsite::cli::Cli;
use lmsite::config::{DEFAULT_CONFIG_PATH, get_config, init_config_from};
use lmsite::runtime::modes::{self, Mode};
use lmsite::system::logging::init_logging;

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

    match modes::detect_mode(cli.command.as_ref()) {
        #[cfg(feature = "cli")]
        Mode::Cli => {
            let Some(cmd) = cli.command else {
                return;
            };
            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
        #[cfg(feature = "server")]
        Mode::Server => {
            let config = get_config();
            // guard 必须存活到进程结束
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("Failed to initialize logging: {:#}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = modes::run_server().await {
                tracing::error!("Server exited with error: {:#}", e);
                eprintln!("{:#}", e);
                std::process::exit(1);
            }
        }
        Mode::Unknown => {
            eprintln!("No execution mode available: build with the `server` feature");
            std::process::exit(1);
        }
    }
}
