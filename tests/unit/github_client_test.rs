//! Tests for the GitHub review client against a local one-shot HTTP responder.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use reviewbadge::services::github_client::{GitHubClient, GitHubClientConfig, ReviewSource};
use reviewbadge::types::errors::GitHubError;
use reviewbadge::types::pull_request::PrReference;
use reviewbadge::types::review::ReviewState;

/// Serves exactly one request with `status` and `body`, and hands back the raw request head.
async fn one_shot_server(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&request).to_string());
    });

    (base, rx)
}

fn client_for(base: String, token: &str) -> GitHubClient {
    GitHubClient::new(GitHubClientConfig {
        base_url: base,
        token: token.to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn pr() -> PrReference {
    PrReference {
        owner: "octo-org".to_string(),
        repo: "octo-repo".to_string(),
        number: "42".to_string(),
    }
}

const REVIEWS: &str = r#"[
  {"id": 1, "user": {"login": "Mona", "id": 7}, "state": "COMMENTED", "submitted_at": "2024-01-01T10:00:00Z"},
  {"id": 2, "user": {"login": "hubot"}, "state": "APPROVED", "submitted_at": "2024-01-02T10:00:00Z"},
  {"id": 3, "user": null, "state": "DISMISSED", "submitted_at": "2024-01-03T10:00:00Z"},
  {"id": 4, "user": {"login": "mona"}, "state": "PENDING"}
]"#;

#[tokio::test]
async fn test_list_reviews_sends_expected_request() {
    let (base, request) = one_shot_server("200 OK", REVIEWS).await;
    let client = client_for(base, "ghp_test");

    let reviews = client.list_reviews(&pr()).await.unwrap();
    let request = request.await.unwrap();
    let request_lower = request.to_lowercase();

    assert!(request.starts_with("GET /repos/octo-org/octo-repo/pulls/42/reviews?per_page=100 HTTP/1.1"));
    assert!(request_lower.contains("accept: application/vnd.github+json"));
    assert!(request_lower.contains("authorization: bearer ghp_test"));
    assert!(request_lower.contains("user-agent: reviewbadge/"));

    assert_eq!(reviews.len(), 4);
    assert_eq!(reviews[0].author(), Some("Mona"));
    assert_eq!(reviews[0].state, ReviewState::Commented);
    assert_eq!(reviews[2].author(), None);
    assert_eq!(reviews[2].state, ReviewState::Other("DISMISSED".to_string()));
    assert_eq!(reviews[3].state, ReviewState::Pending);
    assert!(reviews[3].submitted_at.is_none());
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let (base, request) = one_shot_server("200 OK", "[]").await;
    let client = client_for(base, "");

    let reviews = client.list_reviews(&pr()).await.unwrap();
    assert!(reviews.is_empty());
    assert!(!request.await.unwrap().to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_forbidden_is_api_error_with_path() {
    let (base, _request) = one_shot_server("403 Forbidden", r#"{"message":"rate limited"}"#).await;
    let client = client_for(base, "ghp_test");

    let err = client.list_reviews(&pr()).await.unwrap_err();
    assert_eq!(
        err,
        GitHubError::ApiError {
            status: 403,
            path: "/repos/octo-org/octo-repo/pulls/42/reviews?per_page=100".to_string(),
        }
    );
    assert_eq!(err.to_string(), "API 403: /repos/octo-org/octo-repo/pulls/42/reviews?per_page=100");
}

#[tokio::test]
async fn test_not_found_is_api_error() {
    let (base, _request) = one_shot_server("404 Not Found", "{}").await;
    let client = client_for(base, "t");
    assert!(matches!(
        client.list_reviews(&pr()).await,
        Err(GitHubError::ApiError { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_unexpected_body_is_parse_error() {
    let (base, _request) = one_shot_server("200 OK", r#"{"not":"an array"}"#).await;
    let client = client_for(base, "t");
    assert!(matches!(
        client.list_reviews(&pr()).await,
        Err(GitHubError::ParseError(_))
    ));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Bind then drop so the port is very likely closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(base, "t");
    assert!(matches!(
        client.list_reviews(&pr()).await,
        Err(GitHubError::NetworkError(_))
    ));
}
