// SPDX-License-Identifier: MIT
//! The analyzer protocol and the built-in heuristic analyzers.
//!
//! An analyzer is a stateless check over one merge request plus its issue
//! context. Its only side effect is appending to the [`ReviewArtifact`]; it
//! must not touch the network or mutate its inputs, so the aggregator can run
//! the set sequentially without any synchronization. Built-in analyzers never
//! return `Err` — malformed input is "no signal", not a failure. The
//! `Result` in the signature exists so the aggregator's caller stays the
//! single place pipeline failures are observed.

use crate::review::model::{IssueContext, MergeRequestContext, ReviewArtifact, ReviewIssue};
use anyhow::Result;

/// Provenance label for architecture findings.
pub const SOURCE_ARCHITECTURE: &str = "architecture";
/// Provenance label for code findings.
pub const SOURCE_CODE: &str = "code";

/// Diff line count above which the large-diff finding fires.
const LARGE_DIFF_LINES: usize = 300;
/// Diff line count below which the small-diff finding fires.
const SMALL_DIFF_LINES: usize = 5;
/// Diff line count above which the generic test advice fires.
const TEST_ADVICE_DIFF_LINES: usize = 50;

pub trait Analyzer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect the merge request and append findings to `artifact`.
    fn analyze(
        &self,
        mr: &MergeRequestContext,
        issue: &IssueContext,
        artifact: &mut ReviewArtifact,
    ) -> Result<()>;
}

/// The built-in analyzer set in its fixed registration order:
/// context, architecture, code, test. Ordering is part of the rendered
/// output contract, so this is the one place it is defined.
pub fn default_analyzers() -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(ContextAnalyzer),
        Box::new(ArchitectureAnalyzer),
        Box::new(CodeAnalyzer),
        Box::new(TestAnalyzer),
    ]
}

// ─── Context analyzer ─────────────────────────────────────────────────────────

/// Attaches the issue-tracker context to the artifact and records the
/// positive observation derived from it.
pub struct ContextAnalyzer;

impl Analyzer for ContextAnalyzer {
    fn name(&self) -> &'static str {
        "context"
    }

    fn analyze(
        &self,
        _mr: &MergeRequestContext,
        issue: &IssueContext,
        artifact: &mut ReviewArtifact,
    ) -> Result<()> {
        artifact.attach_issue_context(issue.clone());
        match issue.summary.as_deref().filter(|s| !s.is_empty()) {
            Some(summary) => artifact.set_done_well(format!(
                "The change is linked to issue \"{summary}\", which gives it clear business context."
            )),
            None => artifact
                .set_done_well("No linked issue was found in the merge request title."),
        }
        Ok(())
    }
}

// ─── Architecture analyzer ────────────────────────────────────────────────────

/// Flags changed files that touch areas marked legacy or deprecated.
///
/// Matching is a case-insensitive substring test on the file path, so
/// `LEGACY/Foo.java` and `legacyless.java` both trigger.
pub struct ArchitectureAnalyzer;

impl Analyzer for ArchitectureAnalyzer {
    fn name(&self) -> &'static str {
        "architecture"
    }

    fn analyze(
        &self,
        mr: &MergeRequestContext,
        _issue: &IssueContext,
        artifact: &mut ReviewArtifact,
    ) -> Result<()> {
        for file in &mr.changed_files {
            let lower = file.to_lowercase();
            if lower.contains("legacy") || lower.contains("deprecated") {
                artifact.add_issue(ReviewIssue::new(
                    format!("{file} touches a legacy or deprecated area."),
                    "Check whether the supported replacement already covers this case before extending the old code.",
                    SOURCE_ARCHITECTURE,
                ));
            }
        }
        Ok(())
    }
}

// ─── Code analyzer ────────────────────────────────────────────────────────────

/// Size heuristics over the diff plus a naming check for grab-bag utility
/// files. The large-diff and small-diff findings are mutually exclusive.
pub struct CodeAnalyzer;

impl Analyzer for CodeAnalyzer {
    fn name(&self) -> &'static str {
        "code"
    }

    fn analyze(
        &self,
        mr: &MergeRequestContext,
        _issue: &IssueContext,
        artifact: &mut ReviewArtifact,
    ) -> Result<()> {
        let lines = mr.diff.split('\n').count();
        if lines > LARGE_DIFF_LINES {
            artifact.add_issue(ReviewIssue::new(
                "The diff is very large (more than 300 lines).",
                "Split the change into smaller, independently reviewable merge requests.",
                SOURCE_CODE,
            ));
        } else if lines < SMALL_DIFF_LINES {
            artifact.add_issue(ReviewIssue::new(
                "The diff is suspiciously small (fewer than 5 lines).",
                "Verify the change is complete and actually does something meaningful.",
                SOURCE_CODE,
            ));
        }

        for file in &mr.changed_files {
            let lower = file.to_lowercase();
            if lower.contains("util") || lower.contains("helper") {
                artifact.add_issue(ReviewIssue::new(
                    format!("{file} looks like a generic utility file."),
                    "Watch for unbounded growth; prefer a focused module with a clear owner.",
                    SOURCE_CODE,
                ));
            }
        }
        Ok(())
    }
}

// ─── Test analyzer ────────────────────────────────────────────────────────────

/// Suggests where tests are most likely missing. Advice entries are
/// suggestions, not findings, and render in their own section.
pub struct TestAnalyzer;

impl Analyzer for TestAnalyzer {
    fn name(&self) -> &'static str {
        "test"
    }

    fn analyze(
        &self,
        mr: &MergeRequestContext,
        _issue: &IssueContext,
        artifact: &mut ReviewArtifact,
    ) -> Result<()> {
        for file in &mr.changed_files {
            let lower = file.to_lowercase();
            if lower.contains("service") {
                artifact.add_test_advice(format!(
                    "Add or update unit tests for the service changes in {file}."
                ));
            }
            if lower.contains("controller") {
                artifact.add_test_advice(format!(
                    "Add or update endpoint tests for the controller changes in {file}."
                ));
            }
        }

        // Only fall back to the generic advice when the per-file checks found
        // nothing — it relies on the artifact state written just above.
        if artifact.test_advice.is_empty()
            && mr.diff.split('\n').count() > TEST_ADVICE_DIFF_LINES
        {
            artifact.add_test_advice(
                "This is a large change; add tests covering the new behavior.",
            );
        }
        Ok(())
    }
}
