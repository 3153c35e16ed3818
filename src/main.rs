//! Entry point for the reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Restore the cached session token for the configured server.
//! - Launch the GUI application.

mod api;
mod app;
mod cache;
mod cancellation;
mod config;
mod paragraphs;
mod search;
mod speech;

use crate::api::ApiClient;
use crate::app::run_app;
use crate::config::load_config;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let server_override = parse_args()?;
    let mut config = load_config(Path::new("conf/config.toml"));
    if let Some(server) = server_override {
        info!(%server, "Using server from the command line");
        config.server_url = server;
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        server = %config.server_url,
        lang = %config.target_lang,
        level = %config.log_level,
        "Starting reader"
    );

    let token = cache::load_token(&config.server_url);
    if token.is_some() {
        info!("Restored session token from cache");
    }
    let api = ApiClient::new(
        &config.server_url,
        Duration::from_secs(config.request_timeout_secs),
        token,
    )
    .context("Building the API client")?;

    run_app(config, api).context("Failed to start the GUI")?;
    Ok(())
}

fn parse_args() -> Result<Option<String>> {
    let mut args = env::args().skip(1);
    let mut server = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--server" => {
                server = Some(
                    args.next()
                        .ok_or_else(|| anyhow!("--server requires a URL"))?,
                );
            }
            other => {
                return Err(anyhow!(
                    "Unknown argument {other}. Usage: truyen-reader [--server URL]"
                ));
            }
        }
    }
    Ok(server)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
