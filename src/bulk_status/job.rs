use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::BulkStatusError;
use super::report::{format_report, HostPair};
use crate::admin::{helix_admin_url, helix_job_url, AdminClient, RequestOptions};
use crate::config::PollConfig;

/// Remote job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Running,
    Completed,
    Stopped,
    Failed,
    Unknown,
}

impl JobState {
    pub fn parse(state: Option<&str>) -> Self {
        match state {
            Some("created") => Self::Created,
            Some("running") => Self::Running,
            Some("completed") => Self::Completed,
            Some("stopped") => Self::Stopped,
            Some("failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Completed or stopped: the resource data is final.
    pub fn has_report(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

/// Returned by `start-bulk-page-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTicket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    pub job_id: String,
}

/// Returned by `check-bulk-page-status`. `data` and `stop_time` are only
/// present once the job has finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<String>,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    job: Option<JobInfo>,
    links: Option<JobLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobInfo {
    name: Option<String>,
    state: Option<String>,
    create_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobLinks {
    #[serde(rename = "self")]
    self_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobDetails {
    name: Option<String>,
    state: Option<String>,
    create_time: Option<String>,
    start_time: Option<String>,
    stop_time: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct SiteStatus {
    live: Option<HostUrl>,
    preview: Option<HostUrl>,
}

#[derive(Debug, Deserialize)]
struct HostUrl {
    url: Option<String>,
}

/// Turn any path into the glob the status API expects: leading `/`,
/// trailing `/*`. `"/blog"` and `"/blog/"` both become `"/blog/*"`.
pub fn normalize_glob_path(path: &str) -> String {
    if path.is_empty() {
        return "/*".to_string();
    }

    let mut glob = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    if !glob.ends_with("/*") {
        if !glob.ends_with('/') {
            glob.push('/');
        }
        glob.push('*');
    }
    glob
}

/// The job id is whatever follows the last `/job/` in the self link.
fn job_id_from_self_link(link: &str) -> &str {
    link.rsplit_once("/job/").map_or(link, |(_, id)| id)
}

/// Org and site are the first two segments of a job id.
fn org_site_from_job_id(job_id: &str) -> Option<(&str, &str)> {
    let mut parts = job_id.split('/');
    match (parts.next(), parts.next()) {
        (Some(org), Some(site)) if !org.is_empty() && !site.is_empty() => Some((org, site)),
        _ => None,
    }
}

/// Bulk status job orchestration against the Helix admin API.
pub struct BulkStatusJobs<'a> {
    client: &'a AdminClient,
    token: Option<String>,
}

impl<'a> BulkStatusJobs<'a> {
    pub fn new(client: &'a AdminClient) -> Self {
        Self { client, token: None }
    }

    /// Use a caller-supplied admin token instead of the configured one.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn options(&self) -> RequestOptions {
        RequestOptions::get().with_token(self.token.clone())
    }

    /// Submit an asynchronous status job for `path` and everything below it.
    pub async fn start_job(
        &self,
        org: &str,
        site: &str,
        branch: &str,
        path: &str,
    ) -> Result<JobTicket, BulkStatusError> {
        let url = helix_admin_url(self.client.base_url(), "status", org, site, branch, "/*", None);
        let glob = normalize_glob_path(path);

        let body = json!({
            "paths": [glob],
            "select": ["edit", "preview", "live"],
            "forceAsync": true,
        });
        let options = RequestOptions::post_json(body).with_token(self.token.clone());
        let response = self.client.request(&url, options).await?;

        let created: CreateJobResponse = serde_json::from_value(response)
            .map_err(|_| BulkStatusError::JobCreation("response did not contain a job".into()))?;

        let job = match created.job {
            Some(job) if job.state.as_deref() == Some("created") => job,
            Some(job) => {
                return Err(BulkStatusError::JobCreation(format!(
                    "job state is {}",
                    job.state.as_deref().unwrap_or("missing")
                )));
            }
            None => {
                return Err(BulkStatusError::JobCreation(
                    "response did not contain a job".into(),
                ));
            }
        };

        let self_link = created
            .links
            .and_then(|l| l.self_link)
            .ok_or_else(|| BulkStatusError::JobCreation("response has no self link".into()))?;
        let job_id = job_id_from_self_link(&self_link).to_string();

        info!(org, site, branch, glob = %glob, job_id = %job_id, "bulk status job created");

        Ok(JobTicket {
            name: job.name,
            state: "created".to_string(),
            created: job.create_time,
            job_id,
        })
    }

    /// Read a job back. Finished jobs come with the formatted report.
    pub async fn check_job(&self, job_id: &str) -> Result<JobStatusReport, BulkStatusError> {
        let url = helix_job_url(self.client.base_url(), job_id, Some("details"));
        let details = self.fetch_details(&url).await?;
        let state = JobState::parse(details.state.as_deref());

        if state == JobState::Failed {
            warn!(job_id, "bulk status job failed");
            return Err(BulkStatusError::JobFailed {
                job_id: job_id.to_string(),
            });
        }

        let mut report = JobStatusReport {
            name: details.name,
            state: details.state.unwrap_or_else(|| "unknown".to_string()),
            created: details.create_time,
            start_time: details.start_time,
            stop_time: None,
            job_id: job_id.to_string(),
            data: None,
        };

        if !state.has_report() {
            debug!(job_id, state = %report.state, "bulk status job not finished");
            return Ok(report);
        }

        let hosts = match org_site_from_job_id(job_id) {
            Some((org, site)) => self.resolve_hosts(org, site).await,
            None => HostPair::default(),
        };

        report.stop_time = details.stop_time;
        report.data = Some(format_report(details.data, &hosts));
        Ok(report)
    }

    /// Poll a job until it finishes, fails, or the poll budget runs out.
    ///
    /// At most `poll.max_attempts` status reads happen before the deadline
    /// of `interval × max_attempts`. Dropping the future stops polling.
    pub async fn wait_for_job(
        &self,
        job_id: &str,
        poll: PollConfig,
    ) -> Result<JobStatusReport, BulkStatusError> {
        let url = helix_job_url(self.client.base_url(), job_id, None);
        let deadline = Instant::now() + poll.deadline();
        let mut attempts = 0u32;

        while attempts < poll.max_attempts {
            attempts += 1;
            let status = self.fetch_details(&url).await?;
            match JobState::parse(status.state.as_deref()) {
                JobState::Failed => {
                    return Err(BulkStatusError::JobFailed {
                        job_id: job_id.to_string(),
                    });
                }
                state if state.has_report() => return self.check_job(job_id).await,
                state => debug!(job_id, attempts, ?state, "waiting for bulk status job"),
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if attempts < poll.max_attempts {
                tokio::time::sleep_until((now + poll.interval).min(deadline)).await;
            }
        }

        warn!(job_id, attempts, "bulk status job did not finish in time");
        Err(BulkStatusError::JobTimeout {
            job_id: job_id.to_string(),
            attempts,
        })
    }

    /// Live and preview hosts of a site. Each host is resolved on its own;
    /// a missing one only turns its own links into `n/a`.
    pub async fn resolve_hosts(&self, org: &str, site: &str) -> HostPair {
        let url = helix_admin_url(self.client.base_url(), "status", org, site, "main", "", None);
        let response = match self.client.request(&url, self.options()).await {
            Ok(v) => v,
            Err(e) => {
                warn!(org, site, "host lookup failed: {e}");
                return HostPair::default();
            }
        };

        let status: SiteStatus = match serde_json::from_value(response) {
            Ok(s) => s,
            Err(e) => {
                warn!(org, site, "unexpected site status response: {e}");
                return HostPair::default();
            }
        };

        let hosts = HostPair {
            live: host_of(status.live.and_then(|h| h.url).as_deref()),
            preview: host_of(status.preview.and_then(|h| h.url).as_deref()),
        };
        if hosts.live.is_none() || hosts.preview.is_none() {
            warn!(
                org,
                site,
                live = hosts.live.is_some(),
                preview = hosts.preview.is_some(),
                "site status is missing a host URL"
            );
        }
        hosts
    }

    async fn fetch_details(&self, url: &str) -> Result<JobDetails, BulkStatusError> {
        let response = self.client.request(url, self.options()).await?;
        serde_json::from_value(response).map_err(|e| BulkStatusError::InvalidResponse(e.to_string()))
    }
}

/// `host[:port]` of a URL; the port is kept only when it is not the
/// scheme default.
fn host_of(raw: Option<&str>) -> Option<String> {
    let parsed = url::Url::parse(raw?).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
