//! Outbound collaborator clients.
//!
//! The traits here are the processor's only view of the outside world, so
//! tests can swap in recording stubs. Production implementations absorb
//! their own transport failures: lookups answer with empty data, and the
//! comment post logs and moves on. Nothing in this module is allowed to take
//! the review pipeline down.

pub mod gitlab;
pub mod jira;

use crate::review::model::IssueContext;
use anyhow::Result;
use async_trait::async_trait;

pub use gitlab::GitLabClient;
pub use jira::JiraClient;

/// Issue-tracker lookup.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch the issue for `key`. Must not fail: with no key, missing
    /// configuration, or any transport/parse error this returns an
    /// [`IssueContext::empty`] carrying the key.
    async fn fetch_issue(&self, key: Option<&str>) -> IssueContext;
}

/// Source-control host operations for one merge request.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Changed file paths for the merge request, in host order. Empty on any
    /// error or missing configuration — never an error.
    async fn fetch_changed_files(&self, project_id: u64, iid: u64) -> Vec<String>;

    /// Post the rendered review as a comment. Fire-and-forget: the
    /// production client logs HTTP failures and returns `Ok`; the `Result`
    /// is part of the seam so test doubles can exercise the processor's
    /// failure boundary.
    async fn post_comment(&self, project_id: u64, iid: u64, body: &str) -> Result<()>;
}
