use assert_cmd::Command;
use httpmock::{
    Method::{GET, PATCH, POST},
    MockServer,
};
use std::io::Write;

fn run_with_env(req: &serde_json::Value, envs: &[(&str, &str)]) -> anyhow::Result<String> {
    let mut cmd = Command::cargo_bin("github-projects-mcp")?;
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let input = serde_json::to_string(req)?;
    let assert = cmd
        .arg("--log-level")
        .arg("warn")
        .write_stdin({
            let mut b = Vec::new();
            writeln!(b, "{}", input).unwrap();
            b
        })
        .assert();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    Ok(output)
}

fn github_env(server: &MockServer) -> Vec<(String, String)> {
    vec![
        ("GITHUB_TOKEN".into(), "t".into()),
        ("GITHUB_API_URL".into(), server.base_url()),
        (
            "GITHUB_GRAPHQL_URL".into(),
            format!("{}/graphql", server.base_url()),
        ),
    ]
}

fn run_against(server: &MockServer, req: &serde_json::Value) -> anyhow::Result<String> {
    let envs = github_env(server);
    let env_refs: Vec<(&str, &str)> = envs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    run_with_env(req, &env_refs)
}

fn rest_issue(number: i64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "node_id": format!("I_{}", number),
        "number": number,
        "title": title,
        "body": "b",
        "state": "open",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-02T00:00:00Z",
        "closed_at": null,
        "html_url": format!("https://github.com/o/r/issues/{}", number),
        "user": {"login": "alice"},
        "assignees": [{"login": "bob"}],
        "labels": [{"name": "bug", "color": "d73a4a"}],
        "milestone": {"title": "v1", "state": "open", "due_on": null},
        "comments": 2
    })
}

#[test]
fn list_issues_forwards_pagination_params() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/o/r/issues")
            .query_param("state", "open")
            .query_param("per_page", "50")
            .query_param("page", "2");
        then.status(200)
            .json_body(serde_json::json!([rest_issue(7, "Seven")]));
    });

    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "list-issues", "arguments": {
            "owner": "o", "repo": "r", "per_page": 50, "page": 2
        }}
    });
    let out = run_against(&server, &req)?;
    m.assert();
    assert!(out.contains("\"issues\""));
    assert!(out.contains("\"Seven\""));
    assert!(out.contains("\"author\":\"alice\""));
    Ok(())
}

#[test]
fn list_issues_joins_labels_with_commas() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/o/r/issues")
            .query_param("labels", "bug,urgent");
        then.status(200).json_body(serde_json::json!([]));
    });

    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "list-issues", "arguments": {
            "owner": "o", "repo": "r", "labels": ["bug", "urgent"]
        }}
    });
    run_against(&server, &req)?;
    m.assert();
    Ok(())
}

#[test]
fn create_issue_posts_title_and_labels() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/o/r/issues")
            .json_body_partial(r#"{"title": "New bug", "labels": ["bug"]}"#);
        then.status(201).json_body(serde_json::json!({
            "id": 100, "node_id": "I_100", "number": 12, "title": "New bug",
            "state": "open", "html_url": "https://github.com/o/r/issues/12"
        }));
    });

    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "create-issue", "arguments": {
            "owner": "o", "repo": "r", "title": "New bug", "labels": ["bug"]
        }}
    });
    let out = run_against(&server, &req)?;
    m.assert();
    assert!(out.contains("\"number\":12"));
    Ok(())
}

#[test]
fn update_issue_with_no_changes_is_invalid_params() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(PATCH).path("/repos/o/r/issues/5");
        then.status(200).json_body(serde_json::json!({}));
    });

    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "update-issue", "arguments": {
            "owner": "o", "repo": "r", "issueNumber": 5
        }}
    });
    let out = run_against(&server, &req)?;
    assert!(out.contains("-32602"));
    assert_eq!(m.hits(), 0);
    Ok(())
}

#[test]
fn update_issue_null_milestone_clears_it() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/o/r/issues/5")
            .json_body_partial(r#"{"milestone": null}"#);
        then.status(200).json_body(serde_json::json!({
            "id": 100, "node_id": "I_100", "number": 5, "title": "T",
            "state": "open", "html_url": "https://github.com/o/r/issues/5"
        }));
    });

    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "update-issue", "arguments": {
            "owner": "o", "repo": "r", "issueNumber": 5, "milestone": null
        }}
    });
    run_against(&server, &req)?;
    m.assert();
    Ok(())
}

#[test]
fn rest_not_found_becomes_error_result() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/repos/o/missing/issues");
        then.status(404)
            .json_body(serde_json::json!({"message": "Not Found"}));
    });

    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "list-issues", "arguments": {"owner": "o", "repo": "missing"}}
    });
    let out = run_against(&server, &req)?;
    assert!(out.contains("\"isError\":true"));
    assert!(out.contains("\"not_found\""));
    Ok(())
}

#[test]
fn rate_limit_headers_surface_reset_time() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/repos/o/r/issues");
        then.status(403)
            .header("x-ratelimit-remaining", "0")
            .header("x-ratelimit-reset", "1735689600")
            .json_body(serde_json::json!({"message": "API rate limit exceeded"}));
    });

    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "list-issues", "arguments": {"owner": "o", "repo": "r"}}
    });
    let out = run_against(&server, &req)?;
    assert!(out.contains("\"isError\":true"));
    assert!(out.contains("\"rate_limited\""));
    assert!(out.contains("2025-01-01"), "reset time missing: {}", out);
    Ok(())
}
