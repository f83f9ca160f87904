use thiserror::Error;

use crate::admin::AdminError;

#[derive(Debug, Error)]
pub enum BulkStatusError {
    /// The admin API did not acknowledge the job with `state: "created"`.
    #[error("Failed to create bulk status job: {0}")]
    JobCreation(String),

    #[error("Bulk status job {job_id} failed")]
    JobFailed { job_id: String },

    #[error("Bulk status job {job_id} timed out after {attempts} status checks")]
    JobTimeout { job_id: String, attempts: u32 },

    #[error("Invalid job response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Admin(#[from] AdminError),
}
