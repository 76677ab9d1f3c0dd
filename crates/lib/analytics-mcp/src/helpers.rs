use analytics_core::control::ControlError;
use analytics_core::response::AnalyticsResponse;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content};
use tracing::warn;

/// Runs CPU-bound engine work on the blocking pool. A task that panics or is
/// cancelled becomes a computation error payload.
pub(crate) async fn run_blocking<F>(task: F) -> AnalyticsResponse
where
    F: FnOnce() -> AnalyticsResponse + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "analysis task did not complete");
            ControlError::Computation(err.to_string()).into()
        }
    }
}

/// Wraps a response as JSON content, flagging error payloads.
pub(crate) fn tool_result(response: &AnalyticsResponse) -> Result<CallToolResult, ErrorData> {
    let content = vec![Content::json(response)?];
    if response.is_error() {
        Ok(CallToolResult::error(content))
    } else {
        Ok(CallToolResult::success(content))
    }
}

/// Renders an argument that failed validation before reaching the engine.
pub(crate) fn rejected(err: impl Into<ControlError>) -> Result<CallToolResult, ErrorData> {
    let err = err.into();
    warn!(kind = %err.kind(), error = %err, "rejected tool arguments");
    tool_result(&AnalyticsResponse::from(err))
}
