//! Integration tests for tool dispatch.
//!
//! Tests drive `handlers::dispatch` and `dispatch_tool_call` with a
//! scripted admin API and check both the tool payloads and the requests
//! that reached the network.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use helix_mcp_server::admin::{AdminError, HttpRequest, HttpResponse, HttpTransport, Method};
use helix_mcp_server::handlers::{self, ToolContext};
use helix_mcp_server::protocol::{JsonRpcRequest, RpcId, ToolCallParams, ToolResult};
use serde_json::{json, Value};

use common::{test_config, test_context, ScriptedTransport};

const CREATE_URL: &str = "https://admin.test/status/acme/site1/main/*";
const JOB_URL: &str = "https://admin.test/job/acme/site1/job-9";
const DETAILS_URL: &str = "https://admin.test/job/acme/site1/job-9/details";
const HOSTS_URL: &str = "https://admin.test/status/acme/site1/main/";

fn call(name: &str, arguments: Value) -> ToolCallParams {
    ToolCallParams {
        name: name.into(),
        arguments: Some(arguments),
    }
}

fn payload(result: &ToolResult) -> Value {
    serde_json::from_str(&result.content[0].text).unwrap()
}

fn error_code(result: &ToolResult) -> String {
    assert!(result.is_error, "expected an error result, got {}", result.content[0].text);
    payload(result)["error"]["code"].as_str().unwrap().to_string()
}

fn created() -> HttpResponse {
    HttpResponse::json(
        202,
        &json!({
            "job": { "name": "job-9", "state": "created", "createTime": "2024-02-01T08:00:00.000Z" },
            "links": { "self": JOB_URL }
        }),
    )
}

// ---------------------------------------------------------------------------
// JSON-RPC methods
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dispatch_tools_list_advertises_all_tools() {
    let ctx = test_context(ScriptedTransport::new());

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(1)),
        method: "tools/list".into(),
        params: None,
    };

    let response = handlers::dispatch(&req, &ctx).await.unwrap();
    let result = response.result.unwrap();
    let tools = result["tools"].as_array().unwrap();

    let tool_names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        tool_names,
        vec![
            "start-bulk-page-status",
            "check-bulk-page-status",
            "bulk-page-status",
            "page-status",
            "audit-log",
            "da-list-sources",
            "da-get-source",
            "da-delete-source",
        ]
    );

    for tool in tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(tool["description"].as_str().unwrap().len() > 10);
    }
    let delete = &tools[7];
    assert_eq!(delete["annotations"]["destructiveHint"], true);
    assert_eq!(delete["annotations"]["readOnlyHint"], false);
}

#[tokio::test]
async fn dispatch_initialize_reports_server_info() {
    let ctx = test_context(ScriptedTransport::new());

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Str("init".into())),
        method: "initialize".into(),
        params: Some(json!({
            "protocolVersion": "2025-06-18",
            "clientInfo": { "name": "test-client", "version": "1.0" }
        })),
    };

    let response = handlers::dispatch(&req, &ctx).await.unwrap();
    assert_eq!(response.id, Some(RpcId::Str("init".into())));
    let result = response.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], "helix-mcp-server");
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn dispatch_notifications_get_no_response() {
    let ctx = test_context(ScriptedTransport::new());

    for method in ["notifications/initialized", "notifications/cancelled"] {
        let req = JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: None,
            method: method.into(),
            params: None,
        };
        assert!(handlers::dispatch(&req, &ctx).await.is_none(), "{method}");
    }
}

#[tokio::test]
async fn dispatch_unknown_method_is_method_not_found() {
    let ctx = test_context(ScriptedTransport::new());

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(5)),
        method: "resources/list".into(),
        params: None,
    };

    let response = handlers::dispatch(&req, &ctx).await.unwrap();
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn dispatch_tools_call_without_params_is_invalid_params() {
    let ctx = test_context(ScriptedTransport::new());

    let req = JsonRpcRequest {
        jsonrpc: "2.0".into(),
        id: Some(RpcId::Number(6)),
        method: "tools/call".into(),
        params: None,
    };

    let response = handlers::dispatch(&req, &ctx).await.unwrap();
    assert_eq!(response.error.unwrap().code, -32602);
}

// ---------------------------------------------------------------------------
// Argument validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_tool_is_reported() {
    let transport = ScriptedTransport::new();
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(&call("rum-data", json!({})), &ctx).await;

    assert_eq!(error_code(&result), "unknown_tool");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn missing_required_argument_never_reaches_network() {
    let transport = ScriptedTransport::new();
    let ctx = test_context(transport.clone());

    let result =
        handlers::dispatch_tool_call(&call("start-bulk-page-status", json!({ "site": "site1" })), &ctx).await;

    assert_eq!(error_code(&result), "invalid_arguments");
    let message = payload(&result)["error"]["message"].as_str().unwrap().to_string();
    assert!(message.contains("start-bulk-page-status"), "{message}");
    assert!(message.contains("org"), "{message}");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn empty_strings_are_rejected() {
    let transport = ScriptedTransport::new();
    let ctx = test_context(transport.clone());

    let start = call("start-bulk-page-status", json!({ "org": "", "site": "site1" }));
    let check = call("check-bulk-page-status", json!({ "jobId": "" }));

    assert_eq!(error_code(&handlers::dispatch_tool_call(&start, &ctx).await), "invalid_arguments");
    assert_eq!(error_code(&handlers::dispatch_tool_call(&check, &ctx).await), "invalid_arguments");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn missing_arguments_object_is_validated_as_empty() {
    let transport = ScriptedTransport::new();
    let ctx = test_context(transport.clone());

    let params = ToolCallParams {
        name: "check-bulk-page-status".into(),
        arguments: None,
    };
    let result = handlers::dispatch_tool_call(&params, &ctx).await;

    assert_eq!(error_code(&result), "invalid_arguments");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn audit_log_since_must_be_relative_window() {
    let transport = ScriptedTransport::new();
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call("audit-log", json!({ "org": "acme", "site": "site1", "since": "yesterday" })),
        &ctx,
    )
    .await;

    assert_eq!(error_code(&result), "invalid_arguments");
    assert!(transport.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Bulk page status tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_tool_returns_job_ticket() {
    let transport = ScriptedTransport::new();
    transport.on(Method::Post, CREATE_URL, created());
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call("start-bulk-page-status", json!({ "org": "acme", "site": "site1" })),
        &ctx,
    )
    .await;

    assert!(!result.is_error);
    let ticket = payload(&result);
    assert_eq!(ticket["jobId"], "acme/site1/job-9");
    assert_eq!(ticket["state"], "created");

    let body: Value = serde_json::from_str(transport.requests()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body["paths"], json!(["/*"]));
}

#[tokio::test]
async fn check_tool_reports_running_job() {
    let transport = ScriptedTransport::new();
    transport.on(
        Method::Get,
        DETAILS_URL,
        HttpResponse::json(200, &json!({ "name": "job-9", "state": "running", "startTime": "2024-02-01T08:00:01.000Z" })),
    );
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call("check-bulk-page-status", json!({ "jobId": "acme/site1/job-9" })),
        &ctx,
    )
    .await;

    assert!(!result.is_error);
    let report = payload(&result);
    assert_eq!(report["state"], "running");
    assert!(report.get("data").is_none());
    assert_eq!(transport.count(Method::Get, HOSTS_URL), 0);
}

#[tokio::test]
async fn check_tool_formats_completed_report() {
    let transport = ScriptedTransport::new();
    transport
        .on(
            Method::Get,
            DETAILS_URL,
            HttpResponse::json(
                200,
                &json!({
                    "name": "job-9",
                    "state": "completed",
                    "stopTime": "2024-02-01T08:00:05.000Z",
                    "data": { "resources": [{
                        "path": "/index",
                        "sourceLastModified": "2024-01-01T00:00:00Z",
                        "previewLastModified": "2024-01-02T00:00:00Z",
                        "publishLastModified": "2024-01-03T00:00:00Z"
                    }] }
                }),
            ),
        )
        .on(
            Method::Get,
            HOSTS_URL,
            HttpResponse::json(
                200,
                &json!({
                    "live": { "url": "https://main--site1--acme.aem.live/" },
                    "preview": { "url": "https://main--site1--acme.aem.page/" }
                }),
            ),
        );
    let ctx = test_context(transport);

    let result = handlers::dispatch_tool_call(
        &call("check-bulk-page-status", json!({ "jobId": "acme/site1/job-9" })),
        &ctx,
    )
    .await;

    assert!(!result.is_error);
    let record = &payload(&result)["data"]["resources"][0];
    assert_eq!(record["status"], "Current");
    assert_eq!(record["publishLink"], "https://main--site1--acme.aem.live/index");
}

#[tokio::test]
async fn failed_job_maps_to_job_failed() {
    let transport = ScriptedTransport::new();
    transport.on(Method::Get, DETAILS_URL, HttpResponse::json(200, &json!({ "state": "failed" })));
    let ctx = test_context(transport);

    let result = handlers::dispatch_tool_call(
        &call("check-bulk-page-status", json!({ "jobId": "acme/site1/job-9" })),
        &ctx,
    )
    .await;

    assert_eq!(error_code(&result), "job_failed");
}

#[tokio::test]
async fn start_tool_maps_rejected_job_to_job_creation_failed() {
    let transport = ScriptedTransport::new();
    transport.on(
        Method::Post,
        CREATE_URL,
        HttpResponse::json(200, &json!({ "job": { "state": "stopped" }, "links": { "self": JOB_URL } })),
    );
    let ctx = test_context(transport);

    let result = handlers::dispatch_tool_call(
        &call("start-bulk-page-status", json!({ "org": "acme", "site": "site1" })),
        &ctx,
    )
    .await;

    assert_eq!(error_code(&result), "job_creation_failed");
}

#[tokio::test(start_paused = true)]
async fn bulk_page_status_waits_for_report() {
    let transport = ScriptedTransport::new();
    transport
        .on(Method::Post, CREATE_URL, created())
        .on(Method::Get, JOB_URL, HttpResponse::json(200, &json!({ "state": "running" })))
        .on(Method::Get, JOB_URL, HttpResponse::json(200, &json!({ "state": "completed" })))
        .on(
            Method::Get,
            DETAILS_URL,
            HttpResponse::json(200, &json!({ "state": "completed", "data": { "resources": [] } })),
        );
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call("bulk-page-status", json!({ "org": "acme", "site": "site1" })),
        &ctx,
    )
    .await;

    assert!(!result.is_error, "{}", result.content[0].text);
    assert_eq!(payload(&result)["data"]["resources"], json!([]));
    assert_eq!(transport.count(Method::Get, JOB_URL), 2);
}

#[tokio::test(start_paused = true)]
async fn bulk_page_status_times_out_after_poll_budget() {
    let transport = ScriptedTransport::new();
    transport
        .on(Method::Post, CREATE_URL, created())
        .on(Method::Get, JOB_URL, HttpResponse::json(200, &json!({ "state": "running" })));
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call("bulk-page-status", json!({ "org": "acme", "site": "site1" })),
        &ctx,
    )
    .await;

    assert_eq!(error_code(&result), "job_timeout");
    assert_eq!(transport.count(Method::Get, JOB_URL), 3);
    assert_eq!(transport.count(Method::Get, DETAILS_URL), 0);
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_error_carries_status_and_x_error() {
    let transport = ScriptedTransport::new();
    transport.on(
        Method::Get,
        "https://admin.test/status/acme/site1/main/index",
        HttpResponse::text(401, "").with_x_error("missing auth"),
    );
    let ctx = test_context(transport);

    let result = handlers::dispatch_tool_call(
        &call("page-status", json!({ "org": "acme", "site": "site1", "path": "/index" })),
        &ctx,
    )
    .await;

    assert_eq!(error_code(&result), "upstream_error");
    let message = payload(&result)["error"]["message"].as_str().unwrap().to_string();
    assert!(message.contains("401"), "{message}");
    assert!(message.contains("missing auth"), "{message}");
}

#[tokio::test]
async fn transport_failure_maps_to_transport_error() {
    let transport = ScriptedTransport::new();
    transport.fail(Method::Get, "https://admin.test/status/acme/site1/main/index", "connection refused");
    let ctx = test_context(transport);

    let result = handlers::dispatch_tool_call(
        &call("page-status", json!({ "org": "acme", "site": "site1", "path": "index" })),
        &ctx,
    )
    .await;

    assert_eq!(error_code(&result), "transport_error");
}

/// Never answers within any reasonable time.
struct StalledTransport;

#[async_trait]
impl HttpTransport for StalledTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, AdminError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(HttpResponse::text(200, ""))
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_tool_is_cut_off_by_tool_timeout() {
    let ctx = ToolContext::with_transport(test_config(), Arc::new(StalledTransport)).unwrap();

    let result = handlers::dispatch_tool_call(
        &call("page-status", json!({ "org": "acme", "site": "site1", "path": "/" })),
        &ctx,
    )
    .await;

    assert_eq!(error_code(&result), "internal_error");
    let message = payload(&result)["error"]["message"].as_str().unwrap().to_string();
    assert_eq!(message, "page-status timed out after 5 seconds");
}

// ---------------------------------------------------------------------------
// Passthrough tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_status_passes_through_with_token_override() {
    let url = "https://admin.test/status/acme/site1/stage/docs/intro";
    let transport = ScriptedTransport::new();
    transport.on(Method::Get, url, HttpResponse::json(200, &json!({ "webPath": "/docs/intro" })));
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call(
            "page-status",
            json!({
                "org": "acme",
                "site": "site1",
                "branch": "stage",
                "path": "/docs/intro",
                "helixAdminApiToken": "caller-token"
            }),
        ),
        &ctx,
    )
    .await;

    assert!(!result.is_error);
    assert_eq!(payload(&result), json!({ "webPath": "/docs/intro" }));
    assert_eq!(transport.requests()[0].header("x-auth-token"), Some("caller-token"));
}

#[tokio::test]
async fn audit_log_sends_filters_as_query() {
    let url = "https://admin.test/log/acme/site1/main?since=7d";
    let transport = ScriptedTransport::new();
    transport.on(Method::Get, url, HttpResponse::json(200, &json!({ "entries": [] })));
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call("audit-log", json!({ "org": "acme", "site": "site1", "since": "7d" })),
        &ctx,
    )
    .await;

    assert!(!result.is_error, "{}", result.content[0].text);
    assert_eq!(payload(&result), json!({ "entries": [] }));
    assert_eq!(transport.count(Method::Get, url), 1);
}

#[tokio::test]
async fn da_tools_use_bearer_auth() {
    let list_url = "https://da.test/list/acme/site1/drafts";
    let source_url = "https://da.test/source/acme/site1/drafts/page.html";
    let transport = ScriptedTransport::new();
    transport
        .on(Method::Get, list_url, HttpResponse::json(200, &json!([{ "name": "page", "ext": "html" }])))
        .on(Method::Get, source_url, HttpResponse::text(200, "<body></body>"));
    let ctx = test_context(transport.clone());

    let list = handlers::dispatch_tool_call(
        &call("da-list-sources", json!({ "org": "acme", "repo": "site1", "path": "/drafts" })),
        &ctx,
    )
    .await;
    let get = handlers::dispatch_tool_call(
        &call("da-get-source", json!({ "org": "acme", "repo": "site1", "path": "drafts/page", "ext": "html" })),
        &ctx,
    )
    .await;

    assert!(!list.is_error);
    assert_eq!(payload(&list)[0]["name"], "page");
    assert_eq!(payload(&get), json!("<body></body>"));
    for req in transport.requests() {
        assert_eq!(req.header("authorization"), Some("Bearer da-secret"));
        assert!(req.header("x-auth-token").is_none());
    }
}

#[tokio::test]
async fn da_delete_confirms_empty_response() {
    let url = "https://da.test/source/acme/site1/old.html";
    let transport = ScriptedTransport::new();
    transport.on(Method::Delete, url, HttpResponse::text(204, ""));
    let ctx = test_context(transport.clone());

    let result = handlers::dispatch_tool_call(
        &call("da-delete-source", json!({ "org": "acme", "repo": "site1", "path": "old", "ext": "html" })),
        &ctx,
    )
    .await;

    assert!(!result.is_error);
    assert_eq!(payload(&result), json!({ "deleted": true, "url": url }));
    assert_eq!(transport.count(Method::Delete, url), 1);
}

#[test]
fn context_rejects_poll_budget_that_cannot_finish() {
    let mut config = test_config();
    config.poll.interval = Duration::ZERO;
    assert!(ToolContext::with_transport(config, ScriptedTransport::new()).is_err());

    let mut config = test_config();
    config.poll.interval = Duration::from_secs(1);
    config.poll.max_attempts = 10;
    config.tool_timeout = Duration::from_secs(5);
    let err = ToolContext::with_transport(config, ScriptedTransport::new())
        .err()
        .unwrap();
    assert!(err.contains("MCP_TOOL_TIMEOUT_SECS"), "{err}");
}
