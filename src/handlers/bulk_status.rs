use tracing::info;

use super::ToolContext;
use crate::bulk_status::BulkStatusJobs;
use crate::protocol::{CheckBulkStatusParams, McpErrorResponse, StartBulkStatusParams, ToolResult};

/// Handle a `start-bulk-page-status` tool call.
///
/// Submits the job and returns immediately with its id; the caller polls
/// with `check-bulk-page-status`.
pub async fn handle_start(params: StartBulkStatusParams, ctx: &ToolContext) -> ToolResult {
    let jobs = BulkStatusJobs::new(&ctx.helix).with_token(params.helix_admin_api_token);

    match jobs
        .start_job(&params.org, &params.site, &params.branch, &params.path)
        .await
    {
        Ok(ticket) => ToolResult::json(&ticket),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}

/// Handle a `check-bulk-page-status` tool call.
pub async fn handle_check(params: CheckBulkStatusParams, ctx: &ToolContext) -> ToolResult {
    let jobs = BulkStatusJobs::new(&ctx.helix).with_token(params.helix_admin_api_token);

    match jobs.check_job(&params.job_id).await {
        Ok(report) => ToolResult::json(&report),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}

/// Handle a `bulk-page-status` tool call: start a job and wait for it
/// within the configured poll budget.
pub async fn handle_wait(params: StartBulkStatusParams, ctx: &ToolContext) -> ToolResult {
    let jobs = BulkStatusJobs::new(&ctx.helix).with_token(params.helix_admin_api_token);

    let ticket = match jobs
        .start_job(&params.org, &params.site, &params.branch, &params.path)
        .await
    {
        Ok(t) => t,
        Err(e) => return McpErrorResponse::from(e).into(),
    };

    info!(
        job_id = %ticket.job_id,
        max_polls = ctx.config.poll.max_attempts,
        "waiting for bulk status job"
    );

    match jobs.wait_for_job(&ticket.job_id, ctx.config.poll).await {
        Ok(report) => ToolResult::json(&report),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}
