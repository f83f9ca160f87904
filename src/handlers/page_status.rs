use super::ToolContext;
use crate::admin::{helix_admin_url, RequestOptions};
use crate::protocol::{McpErrorResponse, PageStatusParams, ToolResult};

/// Handle a `page-status` tool call: passthrough of the Helix status of
/// one page.
pub async fn handle(params: PageStatusParams, ctx: &ToolContext) -> ToolResult {
    let url = helix_admin_url(
        ctx.helix.base_url(),
        "status",
        &params.org,
        &params.site,
        &params.branch,
        &params.path,
        None,
    );
    let options = RequestOptions::get().with_token(params.helix_admin_api_token);

    match ctx.helix.request(&url, options).await {
        Ok(body) => ToolResult::json(&body),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}
