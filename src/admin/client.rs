use std::sync::Arc;

use reqwest::header::HeaderValue;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::AdminError;
use super::transport::{HttpRequest, HttpTransport, Method};
use crate::config::{AdminApiConfig, AuthScheme};

const USER_AGENT: &str = concat!("helix-mcp-server/", env!("CARGO_PKG_VERSION"));

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    /// JSON body; sent with `Content-Type: application/json`.
    pub body: Option<Value>,
    /// Overrides the configured token for this request only.
    pub token: Option<String>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Some(Method::Post),
            body: Some(body),
            token: None,
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Some(Method::Delete),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        if token.as_deref().is_some_and(|t| !t.is_empty()) {
            self.token = token;
        }
        self
    }
}

/// Authenticated client for one admin API.
///
/// Adds the user agent and auth header, sends the request through the
/// configured transport and normalizes the body: JSON when the server says
/// so, a JSON string otherwise. Any non-2xx status is an error carrying the
/// status code and the `x-error` header.
#[derive(Clone)]
pub struct AdminClient {
    config: AdminApiConfig,
    transport: Arc<dyn HttpTransport>,
}

impl AdminClient {
    pub fn new(config: AdminApiConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<Value, AdminError> {
        let method = options.method.unwrap_or(Method::Get);
        let mut headers: Vec<(&'static str, String)> = vec![("User-Agent", USER_AGENT.to_string())];

        let body = match options.body {
            Some(value) => {
                headers.push(("Content-Type", "application/json".to_string()));
                Some(value.to_string())
            }
            None => None,
        };

        let token = options.token.or_else(|| self.config.token.clone());
        if let Some(token) = token {
            headers.push(auth_header(self.config.auth, &token)?);
        }

        debug!(method = method.as_str(), url, "admin request");

        let response = self
            .transport
            .execute(HttpRequest {
                method,
                url: url.to_string(),
                headers,
                body,
            })
            .await?;

        let is_json = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));

        if !response.is_success() {
            warn!(
                status = response.status,
                x_error = response.x_error.as_deref().unwrap_or(""),
                url,
                "admin API returned an error"
            );
            return Err(AdminError::Upstream {
                status: response.status,
                x_error: response.x_error,
                body: response.body,
            });
        }

        if is_json {
            Ok(serde_json::from_str(&response.body).unwrap_or_else(|e| {
                warn!(url, "admin API sent malformed JSON: {e}");
                Value::Object(Default::default())
            }))
        } else {
            Ok(Value::String(response.body))
        }
    }
}

fn auth_header(scheme: AuthScheme, token: &str) -> Result<(&'static str, String), AdminError> {
    let (name, value) = match scheme {
        AuthScheme::Bearer => ("Authorization", format!("Bearer {token}")),
        AuthScheme::XAuthToken => ("X-Auth-Token", token.to_string()),
    };
    HeaderValue::from_str(&value).map_err(|_| AdminError::InvalidHeader { name })?;
    Ok((name, value))
}
