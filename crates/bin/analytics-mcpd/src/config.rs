use clap::{ArgAction, Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use analytics_core::control::{ControlOptions, DEFAULT_PREVIEW_ROWS};
use analytics_mcp::server::McpHttpServerConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4030";
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "analytics-mcpd", version, about = "Analytics MCP daemon.")]
struct CliArgs {
    #[arg(
        long = "stdio",
        env = "ANALYTICS_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(long, env = "ANALYTICS_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "ANALYTICS_STATEFUL_MODE",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    stateful_mode: bool,

    #[arg(
        long,
        env = "ANALYTICS_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    sse_keep_alive_secs: u64,

    #[arg(long, env = "ANALYTICS_PREVIEW_ROWS", default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    #[arg(long, env = "ANALYTICS_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub enable_stdio: bool,
    pub mcp_http_addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub preview_rows: usize,
    pub log_filter: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl AnalyticsConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }

    pub const fn control_options(&self) -> ControlOptions {
        ControlOptions::new().with_preview_rows(self.preview_rows)
    }

    pub const fn http_config(&self) -> McpHttpServerConfig {
        McpHttpServerConfig::new(self.mcp_http_addr)
            .with_stateful_mode(self.stateful_mode)
            .with_sse_keep_alive(self.sse_keep_alive)
    }
}

impl TryFrom<CliArgs> for AnalyticsConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let sse_keep_alive = if args.sse_keep_alive_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(args.sse_keep_alive_secs))
        };

        if args.preview_rows == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "ANALYTICS_PREVIEW_ROWS",
                value: args.preview_rows.to_string(),
            });
        }

        let log_filter = args.log_filter.trim().to_string();
        if log_filter.is_empty() {
            return Err(ConfigError::MissingSetting("ANALYTICS_LOG"));
        }
        if EnvFilter::try_new(&log_filter).is_err() {
            return Err(ConfigError::InvalidSetting {
                name: "ANALYTICS_LOG",
                value: log_filter,
            });
        }

        Ok(Self {
            enable_stdio: args.enable_stdio,
            mcp_http_addr: args.mcp_http_addr,
            stateful_mode: args.stateful_mode,
            sse_keep_alive,
            preview_rows: args.preview_rows,
            log_filter,
        })
    }
}
