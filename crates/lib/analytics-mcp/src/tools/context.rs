use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::AnalyticsMcp;

/// Payload listing the MCP commands this server exposes.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HelpCommands {
    pub commands: Vec<String>,
}

impl Default for HelpCommands {
    fn default() -> Self {
        Self {
            commands: vec![
                "help - List the MCP commands this server exposes.".to_string(),
                "health - Returns ok when the server is running.".to_string(),
                "inspect_schema - Infer each column's kind with missing and distinct counts."
                    .to_string(),
                "analyze_csv - Compute summary, correlation, missing and distribution reports."
                    .to_string(),
                "filter_csv - Keep rows matching one column condition and optionally save them."
                    .to_string(),
                "group_by_analysis - Group rows by a column and aggregate value columns."
                    .to_string(),
            ],
        }
    }
}

#[tool_router(router = tool_router_context, vis = "pub")]
impl AnalyticsMcp {
    #[tool(description = "List the MCP commands this server exposes.")]
    async fn help(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::json(HelpCommands::default())?]))
    }
}
