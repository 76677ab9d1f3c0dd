//! Daemon entry point for the analytics MCP server.
//!
//! Loads configuration from CLI arguments and the environment, installs the
//! tracing subscriber, and serves the MCP protocol over stdio or streamable
//! HTTP.

mod config;

use std::sync::Arc;

use analytics_core::control::AnalyticsControlPlane;
use analytics_mcp::server::{serve_stdio, serve_streamable_http};
use tracing_subscriber::EnvFilter;

use crate::config::AnalyticsConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AnalyticsConfig::from_args()?;
    init_tracing(&config.log_filter)?;

    let control = Arc::new(AnalyticsControlPlane::with_options(config.control_options()));
    tracing::info!(
        stdio = config.enable_stdio,
        preview_rows = config.preview_rows,
        "starting analytics-mcpd"
    );
    if config.enable_stdio {
        serve_stdio(control).await
    } else {
        serve_streamable_http(control, config.http_config()).await
    }
}

// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(filter: &str) -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init()
}
