//! MCP server implementation for analytics-mcp.
//!
//! This crate wires the analytics control plane into rmcp tool handlers and
//! exposes the file-level analysis tools over stdio or streamable HTTP.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use analytics_core::control::{AnalyticsControlPlane, OperationRequest};
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

const SERVER_INSTRUCTIONS: &str = r"analytics-mcp analyzes delimited tabular files (CSV, or TSV by extension) on the local filesystem.

Workflow:
1. Call `inspect_schema` with a `file_path` to see each column's inferred kind (numeric, text, temporal, boolean) and its missing and distinct counts.
2. Run an analysis on the same path:
   - `analyze_csv` computes reports; `operations` is any of `summary`, `correlation`, `missing`, `distribution`.
   - `filter_csv` keeps rows matching one `column` / `condition` / `value` predicate and saves them to `<stem>_filtered.<ext>` unless `save` is false or `output_path` is given.
   - `group_by_analysis` groups by `group_column` and applies `agg_functions` (`mean`, `sum`, `count`, `min`, `max`, `median`) to each of `agg_columns`.
3. Saved filter output is an ordinary file; pass its path to any tool to keep analyzing.

Notes:
- Conditions: `equals`, `not_equals`, `greater_than`, `less_than`, `greater_or_equal`, `less_or_equal`, `contains`, `starts_with`, `ends_with` (symbols like `>=` also work).
- Missing cells never match a condition and are skipped by statistics. Undefined statistics are `null`.
- Every result is a JSON object tagged by `kind`; failures use `kind: error` with an `error_kind` and a `message`.
- Use `help` for the tool list. `health` returns `ok`.";

/// MCP server wrapper around the analytics control plane and tool routers.
#[derive(Clone)]
pub struct AnalyticsMcp {
    tool_router: ToolRouter<Self>,
    control: Arc<AnalyticsControlPlane>,
}

impl AnalyticsMcp {
    /// Creates a new server owning its control plane.
    #[must_use]
    pub fn new(control: AnalyticsControlPlane) -> Self {
        Self::with_control(Arc::new(control))
    }

    /// Creates a new server using a shared control plane handle.
    #[must_use]
    pub fn with_control(control: Arc<AnalyticsControlPlane>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_analysis()
            + Self::tool_router_data()
            + Self::tool_router_context();
        Self {
            tool_router,
            control,
        }
    }

    /// Executes a request off the async runtime and renders it as a tool result.
    pub(crate) async fn run(
        &self,
        request: OperationRequest,
    ) -> Result<CallToolResult, ErrorData> {
        let control = Arc::clone(&self.control);
        let response = helpers::run_blocking(move || control.execute(request)).await;
        helpers::tool_result(&response)
    }
}

impl Default for AnalyticsMcp {
    fn default() -> Self {
        Self::new(AnalyticsControlPlane::default())
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl AnalyticsMcp {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }
}

#[tool_handler]
impl ServerHandler for AnalyticsMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
