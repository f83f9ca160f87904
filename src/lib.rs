//! MCP server for the Helix and DA admin APIs.
//!
//! Exposes page status, audit log, DA source and bulk page status tools over
//! JSON-RPC 2.0 stdio transport, compatible with any MCP-aware AI agent.
//!
//! The bulk page status workflow is split in two calls: `start-bulk-page-status`
//! submits an asynchronous status job and returns its id, and
//! `check-bulk-page-status` reads the job back and, once it has finished,
//! turns the raw resource list into a per-page lifecycle report.

pub mod admin;
pub mod bulk_status;
pub mod config;
pub mod handlers;
pub mod protocol;
pub mod server;

pub mod schema;
