// SPDX-License-Identifier: MIT
//! Aggregator — runs the registered analyzers over one fresh artifact.

use crate::review::analyzer::{default_analyzers, Analyzer};
use crate::review::model::{IssueContext, MergeRequestContext, ReviewArtifact};
use anyhow::Result;
use tracing::debug;

/// Holds the analyzer list in its fixed execution order.
///
/// The list is injected at construction — no runtime discovery — so the
/// accumulation order in the artifact, and therefore the rendered output, is
/// deterministic. Analyzer errors are not caught here; they propagate to the
/// event processor, the single place pipeline failures are handled.
pub struct Aggregator {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Aggregator {
    pub fn new(analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self { analyzers }
    }

    /// The built-in set: context, architecture, code, test.
    pub fn default_set() -> Self {
        Self::new(default_analyzers())
    }

    /// Run every analyzer, in order, against one fresh artifact.
    ///
    /// With zero analyzers this still returns a valid empty artifact.
    pub fn review(
        &self,
        mr: &MergeRequestContext,
        issue: &IssueContext,
    ) -> Result<ReviewArtifact> {
        let mut artifact = ReviewArtifact::new();
        for analyzer in &self.analyzers {
            debug!(analyzer = analyzer.name(), "running analyzer");
            analyzer.analyze(mr, issue, &mut artifact)?;
        }
        Ok(artifact)
    }
}
