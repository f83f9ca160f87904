pub mod audit_log;
pub mod bulk_status;
pub mod da_source;
pub mod page_status;
pub mod registry;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::admin::{AdminClient, AdminError, HttpTransport, ReqwestTransport};
use crate::bulk_status::BulkStatusError;
use crate::config::ServerConfig;
use crate::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpErrorCode,
    McpErrorResponse, ToolCallParams, ToolResult,
};
use registry::{ToolKind, ToolRegistry};

const PROTOCOL_VERSION: &str = "2025-06-18";

/// Everything a tool call needs: configuration, one client per admin API
/// and the compiled tool table. Immutable once built.
pub struct ToolContext {
    pub config: ServerConfig,
    pub helix: AdminClient,
    pub da: AdminClient,
    registry: ToolRegistry,
}

impl ToolContext {
    /// Build a context that talks to the real admin APIs.
    pub fn new(config: ServerConfig) -> Result<Self, String> {
        let transport = ReqwestTransport::new(config.tool_timeout).map_err(|e| e.to_string())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build a context on top of any transport.
    pub fn with_transport(
        config: ServerConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, String> {
        config.validate()?;
        let registry = ToolRegistry::new().map_err(|e| format!("invalid tool schema: {e}"))?;
        Ok(Self {
            helix: AdminClient::new(config.helix.clone(), Arc::clone(&transport)),
            da: AdminClient::new(config.da.clone(), transport),
            config,
            registry,
        })
    }
}

impl From<AdminError> for McpErrorResponse {
    fn from(err: AdminError) -> Self {
        Self::from_admin_ref(&err)
    }
}

impl From<BulkStatusError> for McpErrorResponse {
    fn from(err: BulkStatusError) -> Self {
        let code = match &err {
            BulkStatusError::JobCreation(_) => McpErrorCode::JobCreationFailed,
            BulkStatusError::JobFailed { .. } => McpErrorCode::JobFailed,
            BulkStatusError::JobTimeout { .. } => McpErrorCode::JobTimeout,
            BulkStatusError::InvalidResponse(_) => McpErrorCode::UpstreamError,
            BulkStatusError::Admin(inner) => return McpErrorResponse::from_admin_ref(inner),
        };
        McpErrorResponse::new(code, err.to_string())
    }
}

impl McpErrorResponse {
    fn from_admin_ref(err: &AdminError) -> Self {
        let code = match err {
            AdminError::Upstream { .. } => McpErrorCode::UpstreamError,
            AdminError::Transport { .. } => McpErrorCode::TransportError,
            AdminError::InvalidHeader { .. } => McpErrorCode::InvalidArguments,
        };
        McpErrorResponse::new(code, err.to_string())
    }
}

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(req: &JsonRpcRequest, ctx: &ToolContext) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => {
            if let Some(params) = req
                .params
                .clone()
                .and_then(|v| serde_json::from_value::<InitializeParams>(v).ok())
            {
                let client = params.client_info.as_ref();
                info!(
                    protocol_version = params.protocol_version.as_deref().unwrap_or("unknown"),
                    client_name = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
                    client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
                    "client initializing"
                );
            }

            let result = serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "helix-mcp-server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            });
            Some(JsonRpcResponse::success(req.id.clone(), result))
        }

        "notifications/initialized" => None,

        "ping" => Some(JsonRpcResponse::success(req.id.clone(), serde_json::json!({}))),

        "tools/list" => Some(JsonRpcResponse::success(req.id.clone(), ctx.registry.list())),

        "tools/call" => {
            let params: ToolCallParams = match &req.params {
                Some(v) => match serde_json::from_value(v.clone()) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            req.id.clone(),
                            JsonRpcError::invalid_params(format!(
                                "Invalid tools/call params: {e}"
                            )),
                        ));
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(
                        req.id.clone(),
                        JsonRpcError::invalid_params("Missing params for tools/call"),
                    ));
                }
            };

            let tool_result = dispatch_tool_call(&params, ctx).await;
            match serde_json::to_value(&tool_result) {
                Ok(result_json) => Some(JsonRpcResponse::success(req.id.clone(), result_json)),
                Err(e) => Some(JsonRpcResponse::error(
                    req.id.clone(),
                    JsonRpcError::internal_error(format!("Cannot serialize tool result: {e}")),
                )),
            }
        }

        _ => {
            // Unknown notifications are ignored, unknown requests get an error
            req.id.as_ref()?;
            Some(JsonRpcResponse::error(
                req.id.clone(),
                JsonRpcError::method_not_found(&req.method),
            ))
        }
    }
}

/// Validate the arguments against the tool's schema, then run the handler
/// under the configured tool timeout.
pub async fn dispatch_tool_call(params: &ToolCallParams, ctx: &ToolContext) -> ToolResult {
    let Some(tool) = ctx.registry.get(&params.name) else {
        return McpErrorResponse::new(
            McpErrorCode::UnknownTool,
            format!("Unknown tool: {}", params.name),
        )
        .into();
    };

    let args = params
        .arguments
        .clone()
        .unwrap_or_else(|| Value::Object(Default::default()));

    if let Err(e) = tool.schema.validate(&args) {
        debug!(tool = tool.name, "rejected arguments: {e}");
        return McpErrorResponse::new(
            McpErrorCode::InvalidArguments,
            format!("Invalid arguments for {}: {e}", tool.name),
        )
        .into();
    }

    let timeout = ctx.config.tool_timeout;
    match tokio::time::timeout(timeout, run_tool(tool.name, tool.kind, args, ctx)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(tool = tool.name, "tool call timed out after {} seconds", timeout.as_secs());
            McpErrorResponse::new(
                McpErrorCode::InternalError,
                format!("{} timed out after {} seconds", tool.name, timeout.as_secs()),
            )
            .into()
        }
    }
}

async fn run_tool(name: &str, kind: ToolKind, args: Value, ctx: &ToolContext) -> ToolResult {
    debug!(tool = name, "tool call");

    match kind {
        ToolKind::StartBulkPageStatus => match parse_args(name, args) {
            Ok(p) => bulk_status::handle_start(p, ctx).await,
            Err(r) => r,
        },
        ToolKind::CheckBulkPageStatus => match parse_args(name, args) {
            Ok(p) => bulk_status::handle_check(p, ctx).await,
            Err(r) => r,
        },
        ToolKind::BulkPageStatus => match parse_args(name, args) {
            Ok(p) => bulk_status::handle_wait(p, ctx).await,
            Err(r) => r,
        },
        ToolKind::PageStatus => match parse_args(name, args) {
            Ok(p) => page_status::handle(p, ctx).await,
            Err(r) => r,
        },
        ToolKind::AuditLog => match parse_args(name, args) {
            Ok(p) => audit_log::handle(p, ctx).await,
            Err(r) => r,
        },
        ToolKind::DaListSources => match parse_args(name, args) {
            Ok(p) => da_source::handle_list(p, ctx).await,
            Err(r) => r,
        },
        ToolKind::DaGetSource => match parse_args(name, args) {
            Ok(p) => da_source::handle_get(p, ctx).await,
            Err(r) => r,
        },
        ToolKind::DaDeleteSource => match parse_args(name, args) {
            Ok(p) => da_source::handle_delete(p, ctx).await,
            Err(r) => r,
        },
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolResult> {
    serde_json::from_value(args).map_err(|e| {
        McpErrorResponse::new(
            McpErrorCode::InvalidArguments,
            format!("Invalid arguments for {tool}: {e}"),
        )
        .into()
    })
}
