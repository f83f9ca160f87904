//! REST path builders for the two admin APIs.
//!
//! Segments are joined verbatim. A leading `/` on `path` is dropped so that
//! `"/blog"` and `"blog"` address the same resource.

/// `{base}/{api}/{org}/{repo}/{branch}/{path}[.{ext}]` on the Helix admin API.
pub fn helix_admin_url(
    base: &str,
    api: &str,
    org: &str,
    repo: &str,
    branch: &str,
    path: &str,
    ext: Option<&str>,
) -> String {
    format!(
        "{base}/{api}/{org}/{repo}/{branch}/{}{}",
        strip_leading_slash(path),
        extension(ext)
    )
}

/// `{base}/job/{job_id}[/{suffix}]` on the Helix admin API.
pub fn helix_job_url(base: &str, job_id: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(s) => format!("{base}/job/{job_id}/{s}"),
        None => format!("{base}/job/{job_id}"),
    }
}

/// `{base}/{api}/{org}/{repo}/{path}[.{ext}]` on the DA admin API.
pub fn da_admin_url(base: &str, api: &str, org: &str, repo: &str, path: &str, ext: Option<&str>) -> String {
    format!(
        "{base}/{api}/{org}/{repo}/{}{}",
        strip_leading_slash(path),
        extension(ext)
    )
}

fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

fn extension(ext: Option<&str>) -> String {
    match ext {
        Some(e) if !e.is_empty() => format!(".{}", e.trim_start_matches('.')),
        _ => String::new(),
    }
}
