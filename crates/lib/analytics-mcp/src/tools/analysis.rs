use analytics_core::control::{InspectRequest, OperationRequest, ReportRequest};
use analytics_store::schema::REPORT_SUMMARY;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{AnalyticsMcp, helpers};

fn default_operations() -> Vec<String> {
    vec![REPORT_SUMMARY.to_string()]
}

/// Parameters for computing statistical reports over a file.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeCsvParams {
    pub file_path: String,
    /// Any of `summary`, `correlation`, `missing`, `distribution`.
    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
}

/// Parameters for describing a file's columns.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InspectSchemaParams {
    pub file_path: String,
}

#[tool_router(router = tool_router_analysis, vis = "pub")]
impl AnalyticsMcp {
    #[tool(description = "Compute statistical reports (summary, correlation, missing, distribution) for a CSV file.")]
    async fn analyze_csv(
        &self,
        Parameters(params): Parameters<AnalyzeCsvParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match ReportRequest::from_names(&params.file_path, params.operations.as_slice()) {
            Ok(request) => self.run(OperationRequest::Report(request)).await,
            Err(err) => helpers::rejected(err),
        }
    }

    #[tool(description = "Describe each column of a CSV file: inferred kind, missing count and distinct count.")]
    async fn inspect_schema(
        &self,
        Parameters(params): Parameters<InspectSchemaParams>,
    ) -> Result<CallToolResult, ErrorData> {
        self.run(OperationRequest::Inspect(InspectRequest::new(params.file_path)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    fn write_sales(dir: &Path) -> PathBuf {
        let path = dir.join("sales.csv");
        std::fs::write(&path, "region,revenue\nA,100\nB,200\nA,300\nB,\n")
            .expect("write sales fixture");
        path
    }

    fn payload(result: &CallToolResult) -> serde_json::Value {
        let text = result
            .content
            .first()
            .and_then(|content| content.as_text())
            .map(|content| content.text.clone())
            .expect("tool result should carry text content");
        serde_json::from_str(&text).expect("tool result should be JSON")
    }

    #[tokio::test]
    async fn analyze_defaults_to_summary() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let params: AnalyzeCsvParams =
            serde_json::from_value(serde_json::json!({ "file_path": path }))
                .expect("params deserialize");
        assert_eq!(params.operations, ["summary"]);

        let result = AnalyticsMcp::default()
            .analyze_csv(Parameters(params))
            .await
            .expect("tool call succeeds");
        assert_ne!(result.is_error, Some(true));
        let json = payload(&result);
        assert_eq!(json["kind"], "report");
        assert_eq!(json["sections"][0]["report"], "summary");
    }

    #[tokio::test]
    async fn unknown_operation_is_an_error_result() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let result = AnalyticsMcp::default()
            .analyze_csv(Parameters(AnalyzeCsvParams {
                file_path: path.display().to_string(),
                operations: vec!["summary".to_string(), "histogram".to_string()],
            }))
            .await
            .expect("tool call succeeds");
        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_kind"], "validation");
    }

    #[tokio::test]
    async fn inspect_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = AnalyticsMcp::default()
            .inspect_schema(Parameters(InspectSchemaParams {
                file_path: dir.path().join("absent.csv").display().to_string(),
            }))
            .await
            .expect("tool call succeeds");
        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_kind"], "not_found");
    }
}
