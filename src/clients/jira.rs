//! Jira REST client — issue lookup for the review pipeline.
//!
//! `fetch_issue` never fails its caller: missing key, missing configuration,
//! HTTP errors, and malformed responses all degrade to an empty context that
//! still carries the requested key.

use crate::clients::IssueTracker;
use crate::config::JiraConfig;
use crate::review::model::IssueContext;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

pub struct JiraClient {
    base_url: String,
    username: String,
    api_token: String,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            api_token: config.api_token.clone(),
            client,
        }
    }

    fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.api_token);
        format!("Basic {}", BASE64.encode(credentials))
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_issue(&self, key: Option<&str>) -> IssueContext {
        let owned_key = key.map(str::to_owned);
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return IssueContext::empty(owned_key);
        };
        if self.base_url.is_empty() {
            return IssueContext::empty(owned_key);
        }

        let url = format!("{}/rest/api/2/issue/{key}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", self.basic_auth_header())
            .send()
            .await;

        let body: Value = match response {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(key, err = %err, "failed to parse issue response");
                    return IssueContext::empty(owned_key);
                }
            },
            Ok(resp) => {
                warn!(key, status = %resp.status(), "issue request rejected");
                return IssueContext::empty(owned_key);
            }
            Err(err) => {
                warn!(key, err = %err, "failed to fetch issue");
                return IssueContext::empty(owned_key);
            }
        };

        parse_issue(owned_key, &body)
    }
}

/// Pull the fields the pipeline cares about out of a Jira issue response.
/// Every access is null-safe; anything missing simply stays absent.
fn parse_issue(key: Option<String>, body: &Value) -> IssueContext {
    let fields = body.get("fields");

    let summary = fields
        .and_then(|f| f.get("summary"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    let description = fields
        .and_then(|f| f.get("description"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    let issue_type = fields
        .and_then(|f| f.get("issuetype"))
        .and_then(|t| t.get("name"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    let comments = fields
        .and_then(|f| f.get("comment"))
        .and_then(|c| c.get("comments"))
        .and_then(Value::as_array)
        .map(|comments| {
            comments
                .iter()
                .filter_map(|c| c.get("body").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    IssueContext {
        key,
        summary,
        description,
        issue_type,
        comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unconfigured_client_returns_empty_context_with_key() {
        let client = JiraClient::new(&JiraConfig::default());
        let ctx = client.fetch_issue(Some("KEY-1")).await;
        assert_eq!(ctx.key.as_deref(), Some("KEY-1"));
        assert!(ctx.summary.is_none());
        assert!(ctx.comments.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_returns_empty_context() {
        let client = JiraClient::new(&JiraConfig {
            base_url: "https://jira.example.com".to_string(),
            ..JiraConfig::default()
        });
        let ctx = client.fetch_issue(None).await;
        assert!(ctx.key.is_none());
        assert!(ctx.summary.is_none());
    }

    #[test]
    fn test_parse_issue_extracts_all_fields() {
        let body = json!({
            "fields": {
                "summary": "Summary",
                "description": "Desc",
                "issuetype": { "name": "Bug" },
                "comment": {
                    "comments": [
                        { "body": "first" },
                        { "body": "second" },
                        { "author": "no body field" }
                    ]
                }
            }
        });
        let ctx = parse_issue(Some("PRJ-1".to_string()), &body);
        assert_eq!(ctx.summary.as_deref(), Some("Summary"));
        assert_eq!(ctx.description.as_deref(), Some("Desc"));
        assert_eq!(ctx.issue_type.as_deref(), Some("Bug"));
        assert_eq!(ctx.comments, vec!["first", "second"]);
    }

    #[test]
    fn test_parse_issue_tolerates_malformed_body() {
        for body in [json!({}), json!(null), json!({ "fields": "oops" })] {
            let ctx = parse_issue(Some("PRJ-2".to_string()), &body);
            assert_eq!(ctx.key.as_deref(), Some("PRJ-2"));
            assert!(ctx.summary.is_none());
            assert!(ctx.comments.is_empty());
        }
    }
}
