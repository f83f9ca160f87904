use serde_json::json;

use super::ToolContext;
use crate::admin::{da_admin_url, RequestOptions};
use crate::protocol::{ListSourcesParams, McpErrorResponse, SourceParams, ToolResult};

/// Handle a `da-list-sources` tool call.
pub async fn handle_list(params: ListSourcesParams, ctx: &ToolContext) -> ToolResult {
    let url = da_admin_url(ctx.da.base_url(), "list", &params.org, &params.repo, &params.path, None);

    match ctx.da.request(&url, RequestOptions::get()).await {
        Ok(body) => ToolResult::json(&body),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}

/// Handle a `da-get-source` tool call.
pub async fn handle_get(params: SourceParams, ctx: &ToolContext) -> ToolResult {
    let url = source_url(ctx, &params);

    match ctx.da.request(&url, RequestOptions::get()).await {
        Ok(body) => ToolResult::json(&body),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}

/// Handle a `da-delete-source` tool call.
pub async fn handle_delete(params: SourceParams, ctx: &ToolContext) -> ToolResult {
    let url = source_url(ctx, &params);

    match ctx.da.request(&url, RequestOptions::delete()).await {
        // DELETE answers 204 with an empty body
        Ok(serde_json::Value::String(s)) if s.is_empty() => ToolResult::json(&json!({
            "deleted": true,
            "url": url,
        })),
        Ok(body) => ToolResult::json(&body),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}

fn source_url(ctx: &ToolContext, params: &SourceParams) -> String {
    da_admin_url(
        ctx.da.base_url(),
        "source",
        &params.org,
        &params.repo,
        &params.path,
        Some(&params.ext),
    )
}
