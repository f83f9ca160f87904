//! Shared fixtures: a scripted in-memory transport and test configuration.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use helix_mcp_server::admin::{AdminError, HttpRequest, HttpResponse, HttpTransport, Method};
use helix_mcp_server::config::{AdminApiConfig, PollConfig, ServerConfig};
use helix_mcp_server::handlers::ToolContext;

pub const HELIX: &str = "https://admin.test";
pub const DA: &str = "https://da.test";

/// Replays queued responses per `METHOD url` and records every request.
/// A route's last response repeats once its queue is down to one entry;
/// unknown routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Result<HttpResponse, String>>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

fn key(method: Method, url: &str) -> String {
    format!("{} {url}", method.as_str())
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, url: &str, response: HttpResponse) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(key(method, url))
            .or_default()
            .push_back(Ok(response));
        self
    }

    pub fn fail(&self, method: Method, url: &str, message: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(key(method, url))
            .or_default()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, AdminError> {
        let route = key(request.method, &request.url);
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        let next = match routes.get_mut(&route) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match next {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(message)) => Err(AdminError::Transport { url, message }),
            None => Ok(HttpResponse::text(404, "not found").with_x_error(format!("no route for {route}"))),
        }
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        helix: AdminApiConfig::helix(HELIX, Some("helix-secret".into())),
        da: AdminApiConfig::da(DA, Some("da-secret".into())),
        tool_timeout: Duration::from_secs(5),
        poll: PollConfig {
            interval: Duration::from_millis(1),
            max_attempts: 3,
        },
    }
}

pub fn test_context(transport: Arc<ScriptedTransport>) -> ToolContext {
    ToolContext::with_transport(test_config(), transport).unwrap()
}
