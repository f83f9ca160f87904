use std::time::Duration;

/// Default Helix admin API origin.
pub const DEFAULT_HELIX_ADMIN_URL: &str = "https://admin.hlx.page";
/// Default DA admin API origin.
pub const DEFAULT_DA_ADMIN_URL: &str = "https://admin.da.live";

/// Default timeout for tool operations (30 seconds).
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_MAX_POLLS: u32 = 10;

/// How a token is attached to outgoing admin requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>` (DA admin).
    Bearer,
    /// `X-Auth-Token: <token>` (Helix admin).
    XAuthToken,
}

/// Connection settings for one admin API.
#[derive(Debug, Clone)]
pub struct AdminApiConfig {
    /// Origin without trailing slash, e.g. `https://admin.hlx.page`.
    pub base_url: String,
    pub token: Option<String>,
    pub auth: AuthScheme,
}

impl AdminApiConfig {
    pub fn helix(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            auth: AuthScheme::XAuthToken,
        }
    }

    pub fn da(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            auth: AuthScheme::Bearer,
        }
    }
}

/// Polling budget for the blocking bulk status variant.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollConfig {
    /// Total time the poll loop may spend before giving up.
    pub fn deadline(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_POLLS,
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub helix: AdminApiConfig,
    pub da: AdminApiConfig,
    pub tool_timeout: Duration,
    pub poll: PollConfig,
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `HELIX_ADMIN_API_URL` (optional, default `https://admin.hlx.page`)
    /// - `HELIX_ADMIN_API_TOKEN` (optional): sent as `X-Auth-Token`
    /// - `DA_ADMIN_API_URL` (optional, default `https://admin.da.live`)
    /// - `DA_ADMIN_API_TOKEN` (optional): sent as a bearer token
    /// - `MCP_TOOL_TIMEOUT_SECS` (optional, default 30): max seconds per tool call
    /// - `BULK_STATUS_POLL_INTERVAL_MS` (optional, default 1000)
    /// - `BULK_STATUS_MAX_POLLS` (optional, default 10)
    pub fn from_env() -> Result<Self, String> {
        let helix_url = env_or("HELIX_ADMIN_API_URL", DEFAULT_HELIX_ADMIN_URL);
        let da_url = env_or("DA_ADMIN_API_URL", DEFAULT_DA_ADMIN_URL);

        let tool_timeout_secs = parse_env("MCP_TOOL_TIMEOUT_SECS", DEFAULT_TOOL_TIMEOUT_SECS)?;
        let poll_interval_ms = parse_env("BULK_STATUS_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let max_polls = parse_env("BULK_STATUS_MAX_POLLS", DEFAULT_MAX_POLLS)?;

        let config = Self {
            helix: AdminApiConfig::helix(
                validate_base_url("HELIX_ADMIN_API_URL", &helix_url)?,
                non_empty_env("HELIX_ADMIN_API_TOKEN"),
            ),
            da: AdminApiConfig::da(
                validate_base_url("DA_ADMIN_API_URL", &da_url)?,
                non_empty_env("DA_ADMIN_API_TOKEN"),
            ),
            tool_timeout: Duration::from_secs(tool_timeout_secs),
            poll: PollConfig {
                interval: Duration::from_millis(poll_interval_ms),
                max_attempts: max_polls,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject zero timeouts and poll budgets, and a poll budget that would
    /// outlast the tool timeout.
    pub fn validate(&self) -> Result<(), String> {
        if self.tool_timeout.is_zero() {
            return Err("MCP_TOOL_TIMEOUT_SECS must be a positive integer".to_string());
        }
        if self.poll.interval.is_zero() {
            return Err("BULK_STATUS_POLL_INTERVAL_MS must be a positive integer".to_string());
        }
        if self.poll.max_attempts == 0 {
            return Err("BULK_STATUS_MAX_POLLS must be a positive integer".to_string());
        }
        if self.poll.deadline() >= self.tool_timeout {
            return Err(format!(
                "bulk status poll budget ({} ms x {}) must be shorter than MCP_TOOL_TIMEOUT_SECS ({}s)",
                self.poll.interval.as_millis(),
                self.poll.max_attempts,
                self.tool_timeout.as_secs()
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            helix: AdminApiConfig::helix(DEFAULT_HELIX_ADMIN_URL, None),
            da: AdminApiConfig::da(DEFAULT_DA_ADMIN_URL, None),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            poll: PollConfig::default(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    non_empty_env(name).unwrap_or_else(|| default.to_string())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match non_empty_env(name) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{name} must be a positive integer")),
        None => Ok(default),
    }
}

/// Accept only http(s) origins; the trailing slash is stripped so URL
/// formatting can always join with `/`.
fn validate_base_url(name: &str, raw: &str) -> Result<String, String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("{name} is not a valid URL: {e}"))?;

    match parsed.scheme() {
        "http" | "https" => {}
        s => return Err(format!("{name} has unsupported scheme '{s}', expected http or https")),
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(format!("{name} must not contain a query string or fragment"));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
