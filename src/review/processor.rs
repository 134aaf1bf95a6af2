// SPDX-License-Identifier: MIT
//! Event processor — drives one webhook event through the review pipeline.
//!
//! validate → extract → resolve issue key → enrich → aggregate → render →
//! dispatch, with a single failure boundary wrapped around everything after
//! validation. A pipeline failure is converted into a best-effort admin
//! notification; the webhook caller only ever sees "processed" or "ignored".

use crate::clients::{CodeHost, IssueTracker};
use crate::notify::Notifier;
use crate::review::aggregator::Aggregator;
use crate::review::event;
use crate::review::model::MergeRequestContext;
use crate::review::render::render;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Subject line of the admin notification sent when the pipeline fails.
pub const FAILURE_SUBJECT: &str = "AI-Reviewer failure";

/// Issue keys look like `ABC-123`: an uppercase letter, more uppercase
/// letters or digits, a hyphen, digits.
static ISSUE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][A-Z0-9]+-[0-9]+").expect("issue key pattern is valid"));

/// How one webhook event was handled, as reported back to the event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event is not of interest (wrong kind or action). A no-op, not a
    /// failure.
    Ignored(&'static str),
    /// The pipeline ran. Internal failures still end up here — they are
    /// reported to the admin, never to the event source.
    Processed,
}

pub struct EventProcessor {
    aggregator: Aggregator,
    issue_tracker: Arc<dyn IssueTracker>,
    code_host: Arc<dyn CodeHost>,
    notifier: Arc<dyn Notifier>,
}

impl EventProcessor {
    pub fn new(
        aggregator: Aggregator,
        issue_tracker: Arc<dyn IssueTracker>,
        code_host: Arc<dyn CodeHost>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            aggregator,
            issue_tracker,
            code_host,
            notifier,
        }
    }

    /// Process one raw webhook payload to completion.
    ///
    /// Never returns an error: validation misses are `Ignored`, and any
    /// pipeline failure is caught here, logged, and turned into an admin
    /// notification whose own failure is also swallowed.
    pub async fn process(&self, payload: &Value) -> EventOutcome {
        match event::object_kind(payload) {
            Some("merge_request") => {}
            kind => {
                info!(kind = ?kind, "ignoring event: not a merge_request");
                return EventOutcome::Ignored("not a merge_request event");
            }
        }
        let action = event::action(payload);
        if !matches!(action, Some("open") | Some("update")) {
            info!(action = ?action, "ignoring merge_request event: unsupported action");
            return EventOutcome::Ignored("unsupported merge request action");
        }

        let event_id = Uuid::new_v4();
        info!(%event_id, action = ?action, "processing merge request event");

        if let Err(err) = self.run_pipeline(payload).await {
            error!(%event_id, "review pipeline failed: {err:#}");
            // Re-extract the identifiers straight from the raw payload: the
            // pipeline may have failed before (or because of) extraction.
            let project_id = event::target_project_id(payload);
            let iid = event::iid(payload);
            let body = format!(
                "Review failed. MR: project_id={}, iid={}. Reason: {err:#}",
                display_opt(project_id),
                display_opt(iid),
            );
            if let Err(notify_err) = self.notifier.notify_admin(FAILURE_SUBJECT, &body).await {
                error!(%event_id, "failed to send admin notification: {notify_err:#}");
            }
        }

        EventOutcome::Processed
    }

    /// The fallible part of the pipeline. Everything that can go wrong in
    /// here surfaces as one `Err` handled by `process`.
    async fn run_pipeline(&self, payload: &Value) -> Result<()> {
        let project_id = event::project_id(payload);
        let iid = event::iid(payload);
        let title = event::title(payload).map(str::to_owned);

        if project_id.is_none() || iid.is_none() {
            warn!(
                project_id = ?project_id,
                iid = ?iid,
                "missing identifiers; running degraded review without file lookup or comment post"
            );
        }

        let issue_key = title.as_deref().and_then(find_issue_key);
        // Always consult the tracker, even without a key — it answers with an
        // empty context and the analyzers handle that uniformly.
        let issue = self.issue_tracker.fetch_issue(issue_key.as_deref()).await;

        let changed_files = match (project_id, iid) {
            (Some(project_id), Some(iid)) => {
                self.code_host.fetch_changed_files(project_id, iid).await
            }
            _ => Vec::new(),
        };

        // The diff stands in for a real diff fetch: the size heuristics are
        // calibrated against this shape, so fetching real diffs would change
        // observable behavior.
        let diff = changed_files.join("\n");

        let mr = MergeRequestContext {
            project_id,
            iid,
            author: event::author(payload).map(str::to_owned),
            title,
            description: event::description(payload).map(str::to_owned),
            changed_files,
            diff,
        };

        let artifact = self.aggregator.review(&mr, &issue)?;

        match (project_id, iid) {
            (Some(project_id), Some(iid)) => {
                let body = render(&artifact);
                self.code_host.post_comment(project_id, iid, &body).await?;
                info!(project_id, iid, "review comment dispatched");
            }
            _ => warn!("missing project id or iid; skipping comment post"),
        }

        Ok(())
    }
}

/// First issue-key-shaped substring of `title`, if any.
pub fn find_issue_key(title: &str) -> Option<String> {
    ISSUE_KEY_RE.find(title).map(|m| m.as_str().to_owned())
}

fn display_opt(value: Option<u64>) -> String {
    value.map_or_else(|| "none".to_owned(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_key_found_in_title() {
        assert_eq!(find_issue_key("ABC-123 Fix bug"), Some("ABC-123".to_string()));
        assert_eq!(find_issue_key("fix for PROJ1-42 and later"), Some("PROJ1-42".to_string()));
    }

    #[test]
    fn test_first_issue_key_wins() {
        assert_eq!(
            find_issue_key("ABC-123 relates to DEF-456"),
            Some("ABC-123".to_string())
        );
    }

    #[test]
    fn test_issue_key_requires_two_leading_characters() {
        // A single letter before the hyphen is not a key.
        assert_eq!(find_issue_key("A-1 quick fix"), None);
    }

    #[test]
    fn test_issue_key_is_case_sensitive() {
        assert_eq!(find_issue_key("abc-123 lowercase"), None);
        assert_eq!(find_issue_key("no key here"), None);
    }

    #[test]
    fn test_issue_key_must_start_with_letter() {
        assert_eq!(find_issue_key("123-456"), None);
        // Embedded in a longer token, the match still starts at the letter.
        assert_eq!(find_issue_key("v2ABC-9"), Some("ABC-9".to_string()));
    }

    #[test]
    fn test_display_opt() {
        assert_eq!(display_opt(Some(7)), "7");
        assert_eq!(display_opt(None), "none");
    }
}
