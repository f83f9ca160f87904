//! Admin Request Client for the Helix and DA admin APIs.

pub mod client;
pub mod error;
pub mod transport;
pub mod url;

pub use client::{AdminClient, RequestOptions};
pub use error::AdminError;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use url::{da_admin_url, helix_admin_url, helix_job_url};
