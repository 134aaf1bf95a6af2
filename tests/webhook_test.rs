//! HTTP smoke tests for the webhook surface.
//! Binds the real axum router on a random port and speaks plain HTTP/1.1
//! over a TCP socket — no mock transport layer in between.

use anyhow::Result;
use async_trait::async_trait;
use reviewd::clients::{CodeHost, IssueTracker};
use reviewd::config::ReviewdConfig;
use reviewd::notify::Notifier;
use reviewd::rest;
use reviewd::review::{Aggregator, EventProcessor, IssueContext};
use reviewd::AppContext;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

struct EmptyIssueTracker;

#[async_trait]
impl IssueTracker for EmptyIssueTracker {
    async fn fetch_issue(&self, key: Option<&str>) -> IssueContext {
        IssueContext::empty(key.map(str::to_owned))
    }
}

#[derive(Default)]
struct RecordingCodeHost {
    posts: Mutex<Vec<(u64, u64, String)>>,
}

#[async_trait]
impl CodeHost for RecordingCodeHost {
    async fn fetch_changed_files(&self, _project_id: u64, _iid: u64) -> Vec<String> {
        vec!["src/A.x".to_string(), "src/B.x".to_string()]
    }

    async fn post_comment(&self, project_id: u64, iid: u64, body: &str) -> Result<()> {
        self.posts
            .lock()
            .unwrap()
            .push((project_id, iid, body.to_owned()));
        Ok(())
    }
}

struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify_admin(&self, _subject: &str, _body: &str) -> Result<()> {
        Ok(())
    }
}

/// Spin up the router on a random local port and return its address plus the
/// recording code host for assertions.
async fn start_server() -> (SocketAddr, Arc<RecordingCodeHost>) {
    let code_host = Arc::new(RecordingCodeHost::default());
    let processor = EventProcessor::new(
        Aggregator::default_set(),
        Arc::new(EmptyIssueTracker),
        Arc::clone(&code_host) as Arc<dyn CodeHost>,
        Arc::new(NoopNotifier),
    );
    let ctx = Arc::new(AppContext::new(ReviewdConfig::default(), processor));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = rest::build_router(ctx);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, code_host)
}

/// Send one HTTP/1.1 request and return the raw response.
async fn send_request(addr: SocketAddr, request: String) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn post_request(body: &str) -> String {
    format!(
        "POST /webhook/gitlab HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len()
    )
}

#[tokio::test]
async fn test_health_endpoint_reports_ok() {
    let (addr, _) = start_server().await;

    let response = send_request(
        addr,
        "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200"), "response: {response}");
    assert!(response.contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn test_webhook_processes_merge_request_event() {
    let (addr, code_host) = start_server().await;

    let body = r#"{"object_kind":"merge_request","project":{"id":101},"user":{"name":"Author"},"object_attributes":{"action":"open","iid":7,"title":"ABC-123 Fix bug"}}"#;
    let response = send_request(addr, post_request(body)).await;

    assert!(response.starts_with("HTTP/1.1 200"), "response: {response}");
    assert!(response.contains("\"status\":\"ok\""));

    let posts = code_host.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!((posts[0].0, posts[0].1), (101, 7));
    assert!(posts[0].2.starts_with("[AI-Reviewer | Summary]"));
}

#[tokio::test]
async fn test_webhook_ignores_other_event_kinds() {
    let (addr, code_host) = start_server().await;

    let response = send_request(addr, post_request(r#"{"object_kind":"push"}"#)).await;

    assert!(response.starts_with("HTTP/1.1 202"), "response: {response}");
    assert!(response.contains("\"status\":\"ignored\""));
    assert!(code_host.posts.lock().unwrap().is_empty());
}
