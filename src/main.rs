use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::{config::ServerConfig, env::ProcessEnv, settings::Settings};

pub mod config;
pub mod env;
pub mod error;
pub mod render;
pub mod services;
pub mod settings;

#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[clap(
        long,
        default_value = "settings.toml",
        help = "Path to settings file",
        env = "SETTINGS_PATH"
    )]
    settings: String,

    #[clap(long, help = "Listen address, overrides settings", env = "LISTEN_ADDR")]
    addr: Option<String>,

    #[clap(long, help = "Dotenv file to load, overrides settings", env = "ENV_FILE")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the configuration over HTTP
    Serve,
    /// Print the configuration to stdout
    Render {
        #[clap(long, value_enum, default_value = "php")]
        format: render::Format,

        #[clap(long, help = "Host used for PmaAbsoluteUri in JSON output")]
        host: Option<String>,

        #[clap(
            long,
            help = "Write the secret's value into the PHP output instead of reading it with getenv"
        )]
        inline_secret: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut settings = Settings::load_or_default(&args.settings)
        .with_context(|| format!("Failed to load settings from {}", args.settings))?;
    if let Some(addr) = args.addr {
        settings.addr = addr;
    }
    if let Some(env_file) = args.env_file {
        settings.env_file = Some(env_file);
    }

    env::load_env_file(settings.env_file.as_deref())?;

    let config = match ServerConfig::load(&ProcessEnv) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&settings, config).await,
        Command::Render {
            format,
            host,
            inline_secret,
        } => {
            let secret = if inline_secret {
                render::SecretSource::Inline
            } else {
                render::SecretSource::Environment
            };
            let out = render::render(&config, format, host.as_deref(), secret)?;
            println!("{}", out);
            Ok(())
        }
    }
}

async fn serve(settings: &Settings, config: Arc<ServerConfig>) -> anyhow::Result<()> {
    log::info!("Start with: {:#?}", config);
    if let Some(server) = config.default_server() {
        log::info!(
            "Default server {}:{} ({} auth)",
            server.host,
            server.port,
            server.auth_type.as_str()
        );
    }

    let listener = tokio::net::TcpListener::bind(&settings.addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.addr))?;
    log::info!("Listening on http://{}", settings.addr);

    axum::serve(listener, services::routes(config))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
            log::info!("Shutdown signal received");
        })
        .await?;

    log::warn!("Server exit");
    Ok(())
}
