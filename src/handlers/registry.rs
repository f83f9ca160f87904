//! Static tool table: name, description, input schema and annotations.

use serde_json::{json, Value};

use crate::schema::{CompiledSchema, SchemaValidationError};

/// Which handler a registered tool dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    StartBulkPageStatus,
    CheckBulkPageStatus,
    BulkPageStatus,
    PageStatus,
    AuditLog,
    DaListSources,
    DaGetSource,
    DaDeleteSource,
}

/// Behaviour hints advertised to MCP clients.
#[derive(Debug, Clone, Copy)]
struct Annotations {
    read_only: bool,
    destructive: bool,
    idempotent: bool,
}

struct ToolSpec {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    kind: ToolKind,
    annotations: Annotations,
    input_schema: fn() -> Value,
}

const READ_ONLY: Annotations = Annotations {
    read_only: true,
    destructive: false,
    idempotent: true,
};

const READ_ONLY_VOLATILE: Annotations = Annotations {
    read_only: true,
    destructive: false,
    idempotent: false,
};

const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "start-bulk-page-status",
        title: "Start Bulk Page Status",
        description: "Start an asynchronous job computing the edit, preview and publish status of \
            every page of a site, or of the pages under a given path. Returns a jobId to pass to \
            check-bulk-page-status. The org, site and branch can be read from a page URL of the \
            form https://{branch}--{site}--{org}.aem.live/{path}.",
        kind: ToolKind::StartBulkPageStatus,
        annotations: READ_ONLY_VOLATILE,
        input_schema: start_schema,
    },
    ToolSpec {
        name: "check-bulk-page-status",
        title: "Check Bulk Page Status",
        description: "Check a bulk page status job started with start-bulk-page-status. While the \
            job runs only its state is returned; once it has completed the result lists every page \
            with a status (Current, Not published, Not previewed, Pending changes, No source), \
            timestamps and preview/live links. Call again later if the job is still running.",
        kind: ToolKind::CheckBulkPageStatus,
        annotations: READ_ONLY,
        input_schema: check_schema,
    },
    ToolSpec {
        name: "bulk-page-status",
        title: "Bulk Page Status",
        description: "Start a bulk page status job and wait for its report. Fails with a timeout \
            when the job does not finish within the poll budget; prefer start-bulk-page-status and \
            check-bulk-page-status for large sites.",
        kind: ToolKind::BulkPageStatus,
        annotations: READ_ONLY_VOLATILE,
        input_schema: start_schema,
    },
    ToolSpec {
        name: "page-status",
        title: "Page Status",
        description: "Get the status of a single page: when it was last edited, previewed and \
            published, and by whom.",
        kind: ToolKind::PageStatus,
        annotations: READ_ONLY,
        input_schema: page_status_schema,
    },
    ToolSpec {
        name: "audit-log",
        title: "Audit Log",
        description: "Get the audit log of a site: preview, publish and job operations with user, \
            path, status and duration. Filter with from/to (ISO 8601) or since (e.g. 1h, 24h, 7d).",
        kind: ToolKind::AuditLog,
        annotations: READ_ONLY_VOLATILE,
        input_schema: audit_log_schema,
    },
    ToolSpec {
        name: "da-list-sources",
        title: "List DA Sources",
        description: "List the documents and folders under a path of a DA repository.",
        kind: ToolKind::DaListSources,
        annotations: READ_ONLY,
        input_schema: list_sources_schema,
    },
    ToolSpec {
        name: "da-get-source",
        title: "Get DA Source",
        description: "Get the content of a DA source document.",
        kind: ToolKind::DaGetSource,
        annotations: READ_ONLY,
        input_schema: source_schema,
    },
    ToolSpec {
        name: "da-delete-source",
        title: "Delete DA Source",
        description: "Delete a DA source document.",
        kind: ToolKind::DaDeleteSource,
        annotations: Annotations {
            read_only: false,
            destructive: true,
            idempotent: true,
        },
        input_schema: source_schema,
    },
];

fn non_empty(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

fn token_property() -> Value {
    json!({
        "type": "string",
        "description": "Helix admin API token (optional, overrides the server token)"
    })
}

fn start_schema() -> Value {
    json!({
        "type": "object",
        "required": ["org", "site"],
        "properties": {
            "org": non_empty("The organization name"),
            "site": non_empty("The site name"),
            "branch": { "type": "string", "minLength": 1, "default": "main", "description": "The branch name" },
            "path": { "type": "string", "default": "/", "description": "Start path of the pages to report on" },
            "helixAdminApiToken": token_property()
        }
    })
}

fn check_schema() -> Value {
    json!({
        "type": "object",
        "required": ["jobId"],
        "properties": {
            "jobId": non_empty("Job id returned by start-bulk-page-status"),
            "helixAdminApiToken": token_property()
        }
    })
}

fn page_status_schema() -> Value {
    json!({
        "type": "object",
        "required": ["org", "site", "path"],
        "properties": {
            "org": non_empty("The organization name"),
            "site": non_empty("The site name"),
            "branch": { "type": "string", "minLength": 1, "default": "main", "description": "The branch name" },
            "path": { "type": "string", "description": "The path of the page" },
            "helixAdminApiToken": token_property()
        }
    })
}

fn audit_log_schema() -> Value {
    json!({
        "type": "object",
        "required": ["org", "site"],
        "properties": {
            "org": non_empty("The organization name"),
            "site": non_empty("The site name"),
            "branch": { "type": "string", "minLength": 1, "default": "main", "description": "The branch name" },
            "from": { "type": "string", "description": "Start timestamp (ISO 8601)" },
            "to": { "type": "string", "description": "End timestamp (ISO 8601)" },
            "since": { "type": "string", "pattern": "^[0-9]+[hdm]$", "description": "Relative time window, e.g. 1h, 24h, 7d" },
            "helixAdminApiToken": token_property()
        }
    })
}

fn list_sources_schema() -> Value {
    json!({
        "type": "object",
        "required": ["org", "repo"],
        "properties": {
            "org": non_empty("The organization"),
            "repo": non_empty("Name of the repository"),
            "path": { "type": "string", "default": "", "description": "Folder to list" }
        }
    })
}

fn source_schema() -> Value {
    json!({
        "type": "object",
        "required": ["org", "repo", "path", "ext"],
        "properties": {
            "org": non_empty("The organization"),
            "repo": non_empty("Name of the repository"),
            "path": non_empty("Path to the source content"),
            "ext": non_empty("The source content file extension, e.g. html")
        }
    })
}

/// A tool with its compiled input schema.
pub struct RegisteredTool {
    pub name: &'static str,
    pub kind: ToolKind,
    pub schema: CompiledSchema,
}

/// All tools, with input schemas compiled once at start-up.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Result<Self, SchemaValidationError> {
        let tools = TOOLS
            .iter()
            .map(|spec| {
                Ok(RegisteredTool {
                    name: spec.name,
                    kind: spec.kind,
                    schema: CompiledSchema::compile(&(spec.input_schema)())?,
                })
            })
            .collect::<Result<Vec<_>, SchemaValidationError>>()?;
        Ok(Self { tools })
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// The `tools/list` payload.
    pub fn list(&self) -> Value {
        let tools: Vec<Value> = TOOLS
            .iter()
            .map(|spec| {
                json!({
                    "name": spec.name,
                    "title": spec.title,
                    "description": spec.description,
                    "inputSchema": (spec.input_schema)(),
                    "annotations": {
                        "readOnlyHint": spec.annotations.read_only,
                        "destructiveHint": spec.annotations.destructive,
                        "idempotentHint": spec.annotations.idempotent,
                        "openWorldHint": true
                    }
                })
            })
            .collect();
        json!({ "tools": tools })
    }
}
