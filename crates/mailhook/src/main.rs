//! `mailhook` - SMTP-to-webhook gateway daemon
//!
//! Listens for inbound SMTP, flattens accepted messages into
//! `multipart/form-data`, and POSTs them to configured callback URLs.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailhook_core::{Forwarder, RouteTable, WILDCARD, WebhookDelivery};
use mailhook_smtp::Server;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailhook=info,mailhook_core=info,mailhook_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = config_path()?;
    let config = Config::load(&config_path)?;

    info!(
        listen = %config.listen_addr,
        hostname = config.hostname,
        routes = config.routes.len(),
        wildcard = config.callback_url.is_some(),
        "Starting mailhook"
    );
    if let Some(token) = &config.token {
        tracing::debug!(length = token.len(), "shared token configured");
    }

    let mut routes = match &config.callback_url {
        Some(url) => RouteTable::with_wildcard(url.clone()),
        None => RouteTable::new(),
    };
    for (domain, url) in &config.routes {
        if domain == WILDCARD && config.callback_url.is_some() {
            anyhow::bail!("wildcard route set twice: callback_url and routes[\"*\"]");
        }
        routes.insert(domain.clone(), url.clone());
    }

    let forwarder = Forwarder::new().context("building HTTP client")?;
    let delivery = WebhookDelivery::new(Arc::new(routes), Arc::new(forwarder));
    let server = Server::new(config.hostname, Arc::new(delivery));

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;

    tokio::select! {
        result = server.serve(listener) => {
            result.context("SMTP listener failed")?;
        }
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for shutdown signal")?;
            info!("Shutting down");
        }
    }

    Ok(())
}

/// Config path from `MAILHOOK_CONFIG` or the first CLI argument.
fn config_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("MAILHOOK_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("no config given: set MAILHOOK_CONFIG or pass a path argument")
}
