//! Bulk page status: asynchronous status jobs on the Helix admin API and the
//! per-page lifecycle report built from their results.

pub mod error;
pub mod job;
pub mod report;

pub use error::BulkStatusError;
pub use job::{normalize_glob_path, BulkStatusJobs, JobState, JobStatusReport, JobTicket};
pub use report::{
    classify, format_record, format_report, HostPair, RawResource, ResourceStatusRecord,
    StatusLabel,
};
