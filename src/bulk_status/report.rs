//! Page-status report formatting.
//!
//! Every resource of a finished bulk status job carries three raw
//! timestamps (source edit, preview, publish). The expected pipeline is
//! edit → preview → publish; the label says where a page sits in it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paths that are never reported.
pub const IGNORED_PATHS: [&str; 2] = ["/helix-env.json", "/sitemap.json"];

/// Placeholder for a missing timestamp or link.
pub const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusLabel {
    #[serde(rename = "No source")]
    NoSource,
    #[serde(rename = "Not previewed")]
    NotPreviewed,
    #[serde(rename = "Not published")]
    NotPublished,
    #[serde(rename = "Current")]
    Current,
    #[serde(rename = "Pending changes")]
    PendingChanges,
}

/// Live and preview hostnames of a site, e.g. `main--site--org.aem.live`.
/// An unknown host leaves the matching links as `n/a`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPair {
    pub live: Option<String>,
    pub preview: Option<String>,
}

/// One resource as found in `data.resources` of a job details response.
///
/// Fields stay untyped JSON: the admin API sends strings, but anything
/// else must degrade to "invalid" rather than fail the whole report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResource {
    #[serde(default)]
    pub path: Option<Value>,
    #[serde(default)]
    pub source_last_modified: Option<Value>,
    #[serde(default)]
    pub preview_last_modified: Option<Value>,
    #[serde(default)]
    pub publish_last_modified: Option<Value>,
    #[serde(default)]
    pub publish_config_redirect_location: Option<Value>,
    #[serde(default)]
    pub preview_config_redirect_location: Option<Value>,
}

/// Formatted report line for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatusRecord {
    pub path: String,
    pub is_redirect: bool,
    pub status: StatusLabel,
    pub source_last_modified: String,
    pub preview_last_modified: String,
    pub preview_link: String,
    pub publish_last_modified: String,
    pub publish_link: String,
}

/// Classify a resource from its raw source, preview and publish timestamps.
///
/// First match wins:
/// 1. no valid source → `No source`
/// 2. neither preview nor publish → `Not previewed`
/// 3. preview at or after source, no publish → `Not published`
/// 4. source ≤ preview ≤ publish → `Current`, anything else `Pending changes`
pub fn classify(source: Option<&Value>, preview: Option<&Value>, publish: Option<&Value>) -> StatusLabel {
    classify_times(
        parse_timestamp(source),
        parse_timestamp(preview),
        parse_timestamp(publish),
    )
}

fn classify_times(
    source: Option<DateTime<Utc>>,
    preview: Option<DateTime<Utc>>,
    publish: Option<DateTime<Utc>>,
) -> StatusLabel {
    match (source, preview, publish) {
        (None, _, _) => StatusLabel::NoSource,
        (Some(_), None, None) => StatusLabel::NotPreviewed,
        (Some(s), Some(p), None) if s <= p => StatusLabel::NotPublished,
        (Some(s), Some(p), Some(q)) if s <= p && p <= q => StatusLabel::Current,
        _ => StatusLabel::PendingChanges,
    }
}

/// Build the report line for one resource, or `None` when it has no path
/// or its path is ignored.
pub fn format_record(
    resource: &RawResource,
    preview_host: Option<&str>,
    live_host: Option<&str>,
) -> Option<ResourceStatusRecord> {
    let path = match resource.path.as_ref() {
        Some(Value::String(p)) if !p.is_empty() => p.clone(),
        _ => return None,
    };
    if IGNORED_PATHS.contains(&path.as_str()) {
        return None;
    }

    let source = resource.source_last_modified.as_ref();
    let preview = resource.preview_last_modified.as_ref();
    let publish = resource.publish_last_modified.as_ref();

    let link = |stamp: Option<&Value>, host: Option<&str>| match host {
        Some(host) if is_truthy(stamp) => format!("https://{host}{path}"),
        _ => NOT_AVAILABLE.to_string(),
    };

    let preview_link = link(preview, preview_host);
    let publish_link = link(publish, live_host);

    Some(ResourceStatusRecord {
        path,
        is_redirect: is_truthy(resource.publish_config_redirect_location.as_ref())
            || is_truthy(resource.preview_config_redirect_location.as_ref()),
        status: classify(source, preview, publish),
        source_last_modified: display_timestamp(source),
        preview_last_modified: display_timestamp(preview),
        preview_link,
        publish_last_modified: display_timestamp(publish),
        publish_link,
    })
}

/// Replace `resources` in a job's `data` object with formatted records.
///
/// Other keys of `data` pass through untouched. Missing or malformed
/// `data` yields an empty resource list.
pub fn format_report(data: Value, hosts: &HostPair) -> Value {
    let mut data = match data {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    let raw = match data.remove("resources") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let preview_host = hosts.preview.as_deref();
    let live_host = hosts.live.as_deref();

    let records: Vec<Value> = raw
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawResource>(item).ok())
        .filter_map(|res| format_record(&res, preview_host, live_host))
        .filter_map(|rec| serde_json::to_value(rec).ok())
        .collect();

    data.insert("resources".to_string(), Value::Array(records));
    Value::Object(data)
}

/// Parse an admin API timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS[.f]]` (UTC), a bare
/// date (midnight UTC), or epoch milliseconds as a JSON number.
pub fn parse_timestamp(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    match raw? {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn display_timestamp(raw: Option<&Value>) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%m/%d/%Y %H:%M").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
