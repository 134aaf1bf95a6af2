// SPDX-License-Identifier: MIT
//! Deterministic rendering of a [`ReviewArtifact`] into the posted comment.
//!
//! `render` is a pure function of the artifact: same artifact, same string,
//! however many times it is called. Sections appear in a fixed order and only
//! when their backing data is non-empty.

use crate::review::model::ReviewArtifact;
use std::fmt::Write as _;

/// First line of every rendered review.
pub const HEADING: &str = "[AI-Reviewer | Summary]";

pub fn render(artifact: &ReviewArtifact) -> String {
    let mut out = String::new();
    out.push_str(HEADING);
    out.push_str("\n\n");

    if let Some(issue) = &artifact.issue_context {
        out.push_str("**Issue Context:**\n");
        let _ = writeln!(out, "Key: {}", issue.key.as_deref().unwrap_or("(none)"));
        let _ = writeln!(out, "Summary: {}", issue.summary.as_deref().unwrap_or("(none)"));
        if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "Description: {description}");
        }
        if !issue.comments.is_empty() {
            out.push_str("Comments:\n");
            for comment in &issue.comments {
                let _ = writeln!(out, "  - {comment}");
            }
        }
        out.push('\n');
    }

    if let Some(done_well) = artifact.done_well.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str("**Done well:**\n");
        out.push_str(done_well);
        out.push_str("\n\n");
    }

    if !artifact.issues.is_empty() {
        out.push_str("**Issues found:**\n");
        for (index, issue) in artifact.issues.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", index + 1, issue.description);
            let _ = writeln!(out, "   Recommendation: {}", issue.recommendation);
            let _ = writeln!(out, "   Source: {}", issue.source);
        }
        out.push('\n');
    }

    if !artifact.test_advice.is_empty() {
        out.push_str("**Unit test advice:**\n");
        for (index, advice) in artifact.test_advice.iter().enumerate() {
            let _ = writeln!(out, "{}. {advice}", index + 1);
        }
        out.push('\n');
    }

    // Distinct provenance labels, first-seen order.
    let mut sources: Vec<&str> = Vec::new();
    for issue in &artifact.issues {
        let source = issue.source.as_str();
        if !source.trim().is_empty() && !sources.contains(&source) {
            sources.push(source);
        }
    }
    if !sources.is_empty() {
        let _ = writeln!(out, "**Sources:** {}", sources.join(", "));
    }

    out
}
