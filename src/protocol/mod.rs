pub mod request;
pub mod response;

pub use request::{
    AuditLogParams, CheckBulkStatusParams, InitializeParams, JsonRpcRequest, ListSourcesParams,
    PageStatusParams, RpcId, SourceParams, StartBulkStatusParams, ToolCallParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, McpError, McpErrorCode, McpErrorResponse, ToolResult,
    ToolResultContent,
};
