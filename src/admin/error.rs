use thiserror::Error;

/// Errors raised by the admin request client.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The admin API answered with a non-2xx status.
    #[error("Admin API error: {status} - {}. {body}", x_error.as_deref().unwrap_or("no x-error"))]
    Upstream {
        status: u16,
        x_error: Option<String>,
        body: String,
    },

    /// A header value could not be built (token with control characters etc).
    #[error("Invalid request header {name}")]
    InvalidHeader { name: &'static str },
}

impl AdminError {
    /// HTTP status of an upstream failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
