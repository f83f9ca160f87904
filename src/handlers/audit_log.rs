use url::form_urlencoded;

use super::ToolContext;
use crate::admin::{helix_admin_url, RequestOptions};
use crate::protocol::{AuditLogParams, McpErrorResponse, ToolResult};

/// Handle an `audit-log` tool call.
///
/// The log endpoint is the branch URL without trailing slash; `from`, `to`
/// and `since` are appended as query parameters in that order when given.
pub async fn handle(params: AuditLogParams, ctx: &ToolContext) -> ToolResult {
    let url = audit_log_url(ctx.helix.base_url(), &params);
    let options = RequestOptions::get().with_token(params.helix_admin_api_token);

    match ctx.helix.request(&url, options).await {
        Ok(body) => ToolResult::json(&body),
        Err(e) => McpErrorResponse::from(e).into(),
    }
}

fn audit_log_url(base: &str, params: &AuditLogParams) -> String {
    let branch_url = helix_admin_url(base, "log", &params.org, &params.site, &params.branch, "", None);
    let base_url = branch_url.trim_end_matches('/');

    let mut query = form_urlencoded::Serializer::new(String::new());
    let filters = [
        ("from", params.from.as_deref()),
        ("to", params.to.as_deref()),
        ("since", params.since.as_deref()),
    ];
    let mut any = false;
    for (key, value) in filters {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            query.append_pair(key, v);
            any = true;
        }
    }

    if any {
        format!("{base_url}?{}", query.finish())
    } else {
        base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(from: Option<&str>, since: Option<&str>) -> AuditLogParams {
        AuditLogParams {
            org: "acme".into(),
            site: "site1".into(),
            branch: "main".into(),
            from: from.map(str::to_string),
            to: None,
            since: since.map(str::to_string),
            helix_admin_api_token: None,
        }
    }

    #[test]
    fn no_filters_drops_trailing_slash() {
        assert_eq!(
            audit_log_url("https://admin.hlx.page", &params(None, None)),
            "https://admin.hlx.page/log/acme/site1/main"
        );
    }

    #[test]
    fn filters_are_form_encoded() {
        assert_eq!(
            audit_log_url("https://admin.hlx.page", &params(Some("2024-01-01T00:00:00+01:00"), Some("24h"))),
            "https://admin.hlx.page/log/acme/site1/main?from=2024-01-01T00%3A00%3A00%2B01%3A00&since=24h"
        );
    }
}
