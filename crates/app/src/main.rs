mod cli;
mod config;
mod controller;
mod http;
mod run;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Mode};
use crate::config::ConfigError;
use crate::http::HttpError;
use crate::run::RunError;
use crate::wiring::WiringError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid cli: {0}")]
    InvalidCli(String),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("run error: {0}")]
    Run(#[from] RunError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    config::load_dotenv()?;
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start(cli))
}

async fn start(cli: Cli) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = config::AppConfig::from_env()?;
    let run_inputs = match cli.mode {
        Mode::Run => Some(cli.run_inputs().ok_or_else(|| {
            AppError::InvalidCli("run mode requires --urls and --items".to_string())
        })?),
        Mode::Serve => None,
    };
    let state = wiring::build_state(config)?;
    let shutdown = shutdown_signal();

    match run_inputs {
        Some((urls, items)) => {
            tokio::select! {
                _ = shutdown => {
                    info!("shutdown signal received");
                }
                res = run::run(&state, &urls, &items, cli.seed) => {
                    res?;
                }
            }
        }
        None => {
            let addr = state.config.http_addr;
            let http_state = state.clone();
            let api = tokio::spawn(async move {
                info!(%addr, "http server starting");
                http::serve(addr, http_state).await
            });
            tokio::select! {
                _ = shutdown => {
                    info!("shutdown signal received");
                }
                res = api => {
                    res??;
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
}
