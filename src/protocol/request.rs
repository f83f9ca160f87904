use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request id: a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    Str(String),
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_root() -> String {
    "/".to_string()
}

/// Parameters for `start-bulk-page-status` and `bulk-page-status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBulkStatusParams {
    pub org: String,
    pub site: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_root")]
    pub path: String,
    #[serde(default)]
    pub helix_admin_api_token: Option<String>,
}

/// Parameters for `check-bulk-page-status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBulkStatusParams {
    pub job_id: String,
    #[serde(default)]
    pub helix_admin_api_token: Option<String>,
}

/// Parameters for `page-status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStatusParams {
    pub org: String,
    pub site: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub path: String,
    #[serde(default)]
    pub helix_admin_api_token: Option<String>,
}

/// Parameters for `audit-log`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogParams {
    pub org: String,
    pub site: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub helix_admin_api_token: Option<String>,
}

/// Parameters for `da-list-sources`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListSourcesParams {
    pub org: String,
    pub repo: String,
    #[serde(default)]
    pub path: String,
}

/// Parameters for `da-get-source` and `da-delete-source`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceParams {
    pub org: String,
    pub repo: String,
    pub path: String,
    pub ext: String,
}

/// MCP `initialize` params.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information sent during `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}
