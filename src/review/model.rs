// SPDX-License-Identifier: MIT
//! Data models for the review pipeline.
//!
//! All types are `Serialize`/`Deserialize` so review artifacts can be dumped
//! for debugging and asserted on structurally in tests. Context types are
//! built once per webhook event and never mutated afterwards; the
//! [`ReviewArtifact`] is the single mutable accumulator analyzers write into.

use serde::{Deserialize, Serialize};

// ─── Merge-request context ────────────────────────────────────────────────────

/// Everything the analyzers get to see about one merge request.
///
/// Identifiers are optional because webhook payloads are not trusted to carry
/// them; a context with missing ids still flows through the full analysis,
/// only the final comment post is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestContext {
    /// Numeric project id on the source-control host.
    pub project_id: Option<u64>,
    /// Merge-request sequence number within the project (GitLab `iid`).
    pub iid: Option<u64>,
    /// Display name of the author.
    pub author: Option<String>,
    /// Merge-request title. Also the place the issue key is mined from.
    pub title: Option<String>,
    pub description: Option<String>,
    /// Changed file paths, in the order the host reported them.
    pub changed_files: Vec<String>,
    /// Diff text the size heuristics run over. Currently the newline-join of
    /// `changed_files` — see `EventProcessor` for the known limitation.
    pub diff: String,
}

// ─── Issue-tracker context ────────────────────────────────────────────────────

/// Business context pulled from the issue tracker.
///
/// The pipeline never works with an *absent* issue context, only an empty
/// one: lookups that fail or have nothing to look up return
/// [`IssueContext::empty`] so downstream code has no null-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueContext {
    pub key: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<String>,
    /// Comment bodies, in tracker order.
    pub comments: Vec<String>,
}

impl IssueContext {
    /// An issue context carrying only the key (possibly none) and nothing else.
    pub fn empty(key: Option<String>) -> Self {
        Self {
            key,
            summary: None,
            description: None,
            issue_type: None,
            comments: Vec::new(),
        }
    }
}

// ─── Findings ─────────────────────────────────────────────────────────────────

/// One finding reported by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIssue {
    pub description: String,
    pub recommendation: String,
    /// Provenance label of the analyzer that produced the finding. Kept per
    /// issue (not deduplicated) so the rendered sources summary can list each
    /// distinct label once, in first-seen order.
    pub source: String,
}

impl ReviewIssue {
    pub fn new(
        description: impl Into<String>,
        recommendation: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            recommendation: recommendation.into(),
            source: source.into(),
        }
    }
}

// ─── Review artifact ──────────────────────────────────────────────────────────

/// The accumulator for one pipeline run.
///
/// Owned by exactly one run and appended to by each analyzer in turn;
/// existing entries are never removed or reordered. Rendering is a pure
/// function of the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewArtifact {
    pub issue_context: Option<IssueContext>,
    /// Positive observation text, set (not appended) by the context analyzer.
    pub done_well: Option<String>,
    pub issues: Vec<ReviewIssue>,
    pub test_advice: Vec<String>,
}

impl ReviewArtifact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_issue_context(&mut self, context: IssueContext) {
        self.issue_context = Some(context);
    }

    pub fn set_done_well(&mut self, text: impl Into<String>) {
        self.done_well = Some(text.into());
    }

    pub fn add_issue(&mut self, issue: ReviewIssue) {
        self.issues.push(issue);
    }

    pub fn add_test_advice(&mut self, advice: impl Into<String>) {
        self.test_advice.push(advice.into());
    }
}
