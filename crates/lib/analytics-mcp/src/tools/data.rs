use analytics_core::control::{
    AggregateRequest, ControlError, FilterOutput, FilterRequest, OperationRequest,
};
use analytics_core::engine::ValidationError;
use analytics_store::{AggregateFunction, FilterOperator, FilterPredicate, Value};
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

const fn default_save() -> bool {
    true
}

fn default_functions() -> Vec<String> {
    vec![AggregateFunction::Mean.as_str().to_string()]
}

/// Parameters for filtering a file by one condition.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FilterCsvParams {
    pub file_path: String,
    pub column: String,
    /// `equals`, `not_equals`, `greater_than`, `less_than`, `greater_or_equal`,
    /// `less_or_equal`, `contains`, `starts_with` or `ends_with`.
    pub condition: String,
    /// Comparison value; a string, number or boolean.
    pub value: serde_json::Value,
    pub output_path: Option<String>,
    #[serde(default = "default_save")]
    pub save: bool,
    /// Maximum matching rows returned inline.
    pub limit: Option<usize>,
}

/// Parameters for grouping a file and aggregating value columns.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GroupByParams {
    pub file_path: String,
    pub group_column: String,
    pub agg_columns: Vec<String>,
    /// Any of `mean`, `sum`, `count`, `min`, `max`, `median`.
    #[serde(default = "default_functions")]
    pub agg_functions: Vec<String>,
}

fn comparison_value(value: serde_json::Value) -> Result<Value, ValidationError> {
    match value {
        serde_json::Value::Null => Ok(Value::Missing),
        serde_json::Value::Bool(flag) => Ok(Value::Boolean(flag)),
        serde_json::Value::Number(number) => number
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| ValidationError::new(format!("value {number} is not a finite number"))),
        serde_json::Value::String(text) => Ok(Value::Text(text)),
        other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => Err(
            ValidationError::new(format!("value must be a string, number or boolean, got {other}")),
        ),
    }
}

impl FilterCsvParams {
    fn into_request(self) -> Result<FilterRequest, ControlError> {
        let operator: FilterOperator = self.condition.parse()?;
        let predicate = FilterPredicate {
            column: self.column,
            operator,
            value: comparison_value(self.value)?,
        };
        let output = match (self.save, self.output_path) {
            (false, _) => FilterOutput::None,
            (true, Some(path)) => FilterOutput::Path(path.into()),
            (true, None) => FilterOutput::Derived,
        };
        let request = FilterRequest::new(self.file_path, predicate).with_output(output);
        Ok(match self.limit {
            Some(limit) => request.with_preview_rows(limit),
            None => request,
        })
    }
}

#[tool_router(router = tool_router_data, vis = "pub")]
impl AnalyticsMcp {
    #[tool(description = "Filter CSV rows by one condition on a column, optionally saving the matching rows to a new file.")]
    async fn filter_csv(
        &self,
        Parameters(params): Parameters<FilterCsvParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match params.into_request() {
            Ok(request) => self.run(OperationRequest::Filter(request)).await,
            Err(err) => helpers::rejected(err),
        }
    }

    #[tool(description = "Group CSV rows by a column and aggregate value columns with mean, sum, count, min, max or median.")]
    async fn group_by_analysis(
        &self,
        Parameters(params): Parameters<GroupByParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let request = AggregateRequest::from_names(
            params.file_path,
            params.group_column,
            params.agg_columns,
            params.agg_functions.as_slice(),
        );
        match request {
            Ok(request) => self.run(OperationRequest::Aggregate(request)).await,
            Err(err) => helpers::rejected(err),
        }
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

    fn filter_params(path: &Path, condition: &str, value: serde_json::Value) -> FilterCsvParams {
        serde_json::from_value(serde_json::json!({
            "file_path": path,
            "column": "revenue",
            "condition": condition,
            "value": value,
        }))
        .expect("params deserialize")
    }

    #[tokio::test]
    async fn filter_saves_to_derived_path_by_default() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let params = filter_params(&path, ">", serde_json::json!(150));
        assert!(params.save);

        let result = AnalyticsMcp::default()
            .filter_csv(Parameters(params))
            .await
            .expect("tool call succeeds");
        let json = payload(&result);
        assert_eq!(json["kind"], "filtered");
        assert_eq!(json["condition"], "greater_than");
        assert_eq!(json["matched_rows"], 2);
        assert!(dir.path().join("sales_filtered.csv").is_file());
    }

    #[tokio::test]
    async fn filter_without_save_writes_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let mut params = filter_params(&path, "less_than", serde_json::json!("250"));
        params.save = false;
        params.limit = Some(1);

        let result = AnalyticsMcp::default()
            .filter_csv(Parameters(params))
            .await
            .expect("tool call succeeds");
        let json = payload(&result);
        assert_eq!(json["matched_rows"], 2);
        assert_eq!(json["preview"]["row_count"], 1);
        assert!(json["output_path"].is_null());
        assert!(!dir.path().join("sales_filtered.csv").exists());
    }

    #[tokio::test]
    async fn unknown_condition_is_an_error_result() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let result = AnalyticsMcp::default()
            .filter_csv(Parameters(filter_params(&path, "between", serde_json::json!(1))))
            .await
            .expect("tool call succeeds");
        assert_eq!(result.is_error, Some(true));
        let json = payload(&result);
        assert_eq!(json["kind"], "error");
        assert_eq!(json["error_kind"], "validation");
    }

    #[tokio::test]
    async fn array_value_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let result = AnalyticsMcp::default()
            .filter_csv(Parameters(filter_params(&path, "equals", serde_json::json!([1, 2]))))
            .await
            .expect("tool call succeeds");
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn group_by_defaults_to_mean() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let params: GroupByParams = serde_json::from_value(serde_json::json!({
            "file_path": path,
            "group_column": "region",
            "agg_columns": ["revenue"],
        }))
        .expect("params deserialize");

        let result = AnalyticsMcp::default()
            .group_by_analysis(Parameters(params))
            .await
            .expect("tool call succeeds");
        let json = payload(&result);
        assert_eq!(json["kind"], "table");
        assert_eq!(json["table"]["columns"], serde_json::json!(["region", "revenue_mean"]));
        assert_eq!(json["table"]["rows"][0], serde_json::json!(["A", 200.0]));
        assert_eq!(json["table"]["rows"][1], serde_json::json!(["B", 200.0]));
    }

    #[tokio::test]
    async fn group_by_text_column_mean_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_sales(dir.path());
        let result = AnalyticsMcp::default()
            .group_by_analysis(Parameters(GroupByParams {
                file_path: path.display().to_string(),
                group_column: "revenue".to_string(),
                agg_columns: vec!["region".to_string()],
                agg_functions: vec!["sum".to_string()],
            }))
            .await
            .expect("tool call succeeds");
        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_kind"], "validation");
    }
}
