//! GitLab REST client — changed-file lookup and comment posting.
//!
//! Both operations are best-effort. An unconfigured client (empty base URL)
//! skips the call entirely; transport and parse failures are logged at warn
//! and answered with empty data. GitLab rejects empty comment bodies, but
//! the renderer always emits at least the heading, so that case never
//! arises from the pipeline.

use crate::clients::CodeHost;
use crate::config::GitLabConfig;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

pub struct GitLabClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl GitLabClient {
    pub fn new(config: &GitLabConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            client,
        }
    }

    fn mr_url(&self, project_id: u64, iid: u64, tail: &str) -> String {
        format!(
            "{}/api/v4/projects/{project_id}/merge_requests/{iid}/{tail}",
            self.base_url
        )
    }
}

#[async_trait]
impl CodeHost for GitLabClient {
    async fn fetch_changed_files(&self, project_id: u64, iid: u64) -> Vec<String> {
        if self.base_url.is_empty() {
            return Vec::new();
        }

        let url = self.mr_url(project_id, iid, "changes");
        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await;

        let body: Value = match response {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(iid, err = %err, "failed to parse changed-files response");
                    return Vec::new();
                }
            },
            Ok(resp) => {
                warn!(iid, status = %resp.status(), "changed-files request rejected");
                return Vec::new();
            }
            Err(err) => {
                warn!(iid, err = %err, "failed to fetch changed files");
                return Vec::new();
            }
        };

        body.get("changes")
            .and_then(Value::as_array)
            .map(|changes| {
                changes
                    .iter()
                    .filter_map(|change| change.get("new_path").and_then(Value::as_str))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn post_comment(&self, project_id: u64, iid: u64, body: &str) -> Result<()> {
        if self.base_url.is_empty() {
            info!("GitLab client not configured; skipping comment post");
            return Ok(());
        }

        let url = self.mr_url(project_id, iid, "notes");
        let result = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&json!({ "body": body }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                info!(iid, status = %resp.status(), "posted review comment");
            }
            Ok(resp) => {
                warn!(iid, status = %resp.status(), "comment post rejected");
            }
            Err(err) => {
                warn!(iid, err = %err, "failed to post comment");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> GitLabClient {
        GitLabClient::new(&GitLabConfig::default())
    }

    #[tokio::test]
    async fn test_unconfigured_client_returns_empty_file_list() {
        let files = unconfigured().fetch_changed_files(1, 1).await;
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_client_skips_comment_post() {
        // Must not error and must not attempt any network call.
        unconfigured().post_comment(1, 1, "body").await.unwrap();
    }

    #[test]
    fn test_mr_url_shape() {
        let client = GitLabClient::new(&GitLabConfig {
            base_url: "https://gitlab.example.com/".to_string(),
            ..GitLabConfig::default()
        });
        assert_eq!(
            client.mr_url(101, 7, "notes"),
            "https://gitlab.example.com/api/v4/projects/101/merge_requests/7/notes"
        );
    }
}
