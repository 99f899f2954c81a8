//! Wiremock-backed tests for the GitHub client.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fairplay_github::{GithubClient, GithubConfig, GithubError};

fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::new(GithubConfig {
        token: None,
        base_url: server.uri(),
        timeout_secs: 5,
        max_retries: 2,
        rate_limit_delay_ms: 10,
        detailed_commit_limit: 20,
    })
    .unwrap()
}

fn repo_meta() -> serde_json::Value {
    json!({
        "name": "demo",
        "owner": { "login": "octo" },
        "created_at": "2026-09-25T09:05:00Z",
        "default_branch": "main"
    })
}

fn commit_list_item(sha: &str, author: &str, date: &str) -> serde_json::Value {
    json!({
        "sha": sha,
        "commit": {
            "author": { "name": author, "email": format!("{author}@example.com"), "date": date },
            "message": format!("commit {sha}")
        }
    })
}

#[tokio::test]
async fn fetches_a_full_snapshot_with_commit_stats() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_meta()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            commit_list_item("aaa111", "alice", "2026-09-25T10:00:00Z"),
            commit_list_item("bbb222", "bob", "2026-09-25T11:00:00Z"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits/aaa111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stats": { "additions": 120, "deletions": 30 },
            "files": [ { "filename": "a.py" }, { "filename": "b.py" } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits/bbb222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stats": { "additions": 10, "deletions": 5 },
            "files": [ { "filename": "a.py" } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "login": "alice" }, { "login": "bob" }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let snapshot = client
        .fetch_snapshot("https://github.com/octo/demo")
        .await
        .unwrap();

    assert_eq!(snapshot.name, "demo");
    assert_eq!(snapshot.owner, "octo");
    assert_eq!(snapshot.commits.len(), 2);
    assert_eq!(snapshot.contributors, vec!["alice", "bob"]);

    let first = &snapshot.commits[0];
    assert_eq!(first.sha, "aaa111");
    assert_eq!(first.additions, 120);
    assert_eq!(first.deletions, 30);
    assert_eq!(first.total_changes(), 150);
    assert_eq!(first.files_changed, 2);
}

#[tokio::test]
async fn paginates_through_the_full_commit_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_meta()))
        .mount(&server)
        .await;

    // A full first page forces a second request; the short second page
    // terminates the loop.
    let page_one: Vec<serde_json::Value> = (0..100)
        .map(|i| commit_list_item(&format!("sha{i:03}"), "alice", "2026-09-25T10:00:00Z"))
        .collect();
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(page_one)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            commit_list_item("tail111", "bob", "2026-09-25T11:00:00Z"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "login": "alice" }])))
        .mount(&server)
        .await;

    // No detail fetches: this test is about the listing loop only.
    let client = GithubClient::new(GithubConfig {
        token: None,
        base_url: server.uri(),
        timeout_secs: 5,
        max_retries: 2,
        rate_limit_delay_ms: 10,
        detailed_commit_limit: 0,
    })
    .unwrap();

    let snapshot = client
        .fetch_snapshot("https://github.com/octo/demo")
        .await
        .unwrap();

    assert_eq!(snapshot.commits.len(), 101);
    assert_eq!(snapshot.commits[0].sha, "sha000");
    assert_eq!(snapshot.commits[99].sha, "sha099");
    assert_eq!(snapshot.commits[100].sha, "tail111");
}

#[tokio::test]
async fn commit_detail_failure_degrades_to_zero_stats() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_meta()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            commit_list_item("aaa111", "alice", "2026-09-25T10:00:00Z"),
        ])))
        .mount(&server)
        .await;
    // No detail mock: the detail request 404s.
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "login": "alice" }])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let snapshot = client
        .fetch_snapshot("https://github.com/octo/demo")
        .await
        .unwrap();

    assert_eq!(snapshot.commits.len(), 1);
    assert_eq!(snapshot.commits[0].total_changes(), 0);
    assert_eq!(snapshot.commits[0].files_changed, 0);
}

#[tokio::test]
async fn retries_after_a_rate_limit_response() {
    let server = MockServer::start().await;

    // First hit is rate limited with an already-elapsed reset; the retry
    // succeeds.
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(
            ResponseTemplate::new(403).insert_header("X-RateLimit-Reset", "0"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_meta()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let snapshot = client
        .fetch_snapshot("https://github.com/octo/demo")
        .await
        .unwrap();
    assert_eq!(snapshot.name, "demo");
}

#[tokio::test]
async fn missing_repository_is_a_not_found_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_snapshot("https://github.com/octo/ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, GithubError::NotFound { .. }));
}

#[tokio::test]
async fn fetches_filtered_source_files() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_meta()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/git/trees/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tree": [
                { "path": "src/main.py", "type": "blob" },
                { "path": "node_modules/x/index.js", "type": "blob" },
                { "path": "README.md", "type": "blob" },
                { "path": "src", "type": "tree" }
            ]
        })))
        .mount(&server)
        .await;

    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode("def f():\n    return 1\n");
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/src/main.py"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": encoded,
            "encoding": "base64"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let files = client
        .fetch_source_files("https://github.com/octo/demo", 30)
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "src/main.py");
    assert_eq!(files[0].content, "def f():\n    return 1\n");
}
