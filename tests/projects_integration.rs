use assert_cmd::Command;
use httpmock::{Method::POST, MockServer};
use std::io::Write;

fn run_against(server: &MockServer, req: &serde_json::Value) -> anyhow::Result<String> {
    let mut cmd = Command::cargo_bin("github-projects-mcp")?;
    let input = serde_json::to_string(req)?;
    let assert = cmd
        .env("GITHUB_TOKEN", "t")
        .env("GITHUB_API_URL", server.base_url())
        .env("GITHUB_GRAPHQL_URL", format!("{}/graphql", server.base_url()))
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

fn tool_call(name: &str, arguments: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": name, "arguments": arguments}
    })
}

fn structured(out: &str) -> serde_json::Value {
    let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    v["result"]["structuredContent"].clone()
}

fn item_update_ok(item_id: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "updateProjectV2ItemFieldValue": {"projectV2Item": {"id": item_id}}
        }
    })
}

fn graphql_errors(message: &str) -> serde_json::Value {
    serde_json::json!({
        "data": null,
        "errors": [{"message": message}]
    })
}

#[test]
fn list_projects_happy_path() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("projectsV2");
        then.status(200).json_body(serde_json::json!({
            "data": {
                "user": {
                    "projectsV2": {
                        "pageInfo": {"hasNextPage": true, "endCursor": "CUR"},
                        "nodes": [{
                            "id": "PVT_1", "title": "Roadmap", "shortDescription": null,
                            "url": "https://github.com/users/o/projects/1", "number": 1,
                            "closed": false,
                            "createdAt": "2025-01-01T00:00:00Z",
                            "updatedAt": "2025-01-02T00:00:00Z"
                        }]
                    }
                }
            }
        }));
    });

    let out = run_against(&server, &tool_call("list-projects", serde_json::json!({"login": "o"})))?;
    let sc = structured(&out);
    assert_eq!(sc["projects"][0]["id"], "PVT_1");
    assert_eq!(sc["page_info"]["has_next_page"], true);
    assert_eq!(sc["page_info"]["end_cursor"], "CUR");
    Ok(())
}

#[test]
fn graphql_errors_array_is_a_failure() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(graphql_errors("Something went wrong"));
    });

    let out = run_against(&server, &tool_call("get-project", serde_json::json!({"id": "PVT_1"})))?;
    assert!(out.contains("\"isError\":true"));
    assert!(out.contains("Something went wrong"));
    Ok(())
}

#[test]
fn graphql_rate_limit_surfaces_reset_time() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(403)
            .header("x-ratelimit-remaining", "0")
            .header("x-ratelimit-reset", "1735689600")
            .json_body(serde_json::json!({"message": "API rate limit exceeded"}));
    });

    let out = run_against(&server, &tool_call("get-project", serde_json::json!({"id": "PVT_1"})))?;
    assert!(out.contains("\"isError\":true"));
    assert!(out.contains("\"rate_limited\""));
    assert!(out.contains("API rate limit exceeded"));
    assert!(out.contains("2025-01-01"), "reset time missing: {}", out);
    Ok(())
}

#[test]
fn get_project_null_node_is_not_found() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .json_body(serde_json::json!({"data": {"node": null}}));
    });

    let out = run_against(&server, &tool_call("get-project", serde_json::json!({"id": "PVT_X"})))?;
    assert!(out.contains("\"isError\":true"));
    assert!(out.contains("\"not_found\""));
    Ok(())
}

#[test]
fn field_value_union_rejects_two_alternatives() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(item_update_ok("ITEM_1"));
    });

    let out = run_against(
        &server,
        &tool_call(
            "update-project-item-field",
            serde_json::json!({
                "projectId": "PVT_1", "itemId": "ITEM_1", "fieldId": "F_1",
                "value": {"text": "a", "number": 1.0}
            }),
        ),
    )?;
    assert!(out.contains("-32602"));
    assert!(out.contains("exactly one"));
    assert_eq!(m.hits(), 0);
    Ok(())
}

#[test]
fn update_item_field_sends_single_key_value() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("\"value\":{\"singleSelectOptionId\":\"OPT_1\"}");
        then.status(200).json_body(item_update_ok("ITEM_1"));
    });

    let out = run_against(
        &server,
        &tool_call(
            "update-project-item-field",
            serde_json::json!({
                "projectId": "PVT_1", "itemId": "ITEM_1", "fieldId": "F_1",
                "value": {"singleSelectOptionId": "OPT_1"}
            }),
        ),
    )?;
    m.assert();
    let sc = structured(&out);
    assert_eq!(sc["success"], true);
    assert_eq!(sc["item_id"], "ITEM_1");
    Ok(())
}

#[test]
fn bulk_update_reports_per_item_outcomes_in_order() -> anyhow::Result<()> {
    let server = MockServer::start();
    let ok_a = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("\"itemId\":\"A\"");
        then.status(200).json_body(item_update_ok("A"));
    });
    let fail_b = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("\"itemId\":\"B\"");
        then.status(200).json_body(graphql_errors("B exploded"));
    });
    let ok_c = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("\"itemId\":\"C\"");
        then.status(200).json_body(item_update_ok("C"));
    });

    let out = run_against(
        &server,
        &tool_call(
            "bulk-update-project-item-field",
            serde_json::json!({
                "projectId": "PVT_1", "itemIds": ["A", "B", "C"], "fieldId": "F_1",
                "value": {"number": 8.0}
            }),
        ),
    )?;
    ok_a.assert();
    fail_b.assert();
    ok_c.assert();

    let results = structured(&out)["results"].clone();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["item_id"], "A");
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["item_id"], "B");
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["error"].as_str().unwrap().contains("B exploded"));
    assert_eq!(results[2]["item_id"], "C");
    assert_eq!(results[2]["success"], true);
    Ok(())
}

#[test]
fn create_item_stops_applying_values_after_a_failure() -> anyhow::Result<()> {
    let server = MockServer::start();
    let add = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("addProjectV2ItemById");
        then.status(200).json_body(serde_json::json!({
            "data": {"addProjectV2ItemById": {"item": {"id": "ITEM_1"}}}
        }));
    });
    let first = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("\"fieldId\":\"F1\"");
        then.status(200).json_body(item_update_ok("ITEM_1"));
    });
    let second = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("\"fieldId\":\"F2\"");
        then.status(200).json_body(graphql_errors("bad value"));
    });
    let third = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("\"fieldId\":\"F3\"");
        then.status(200).json_body(item_update_ok("ITEM_1"));
    });

    let out = run_against(
        &server,
        &tool_call(
            "create-project-item",
            serde_json::json!({
                "projectId": "PVT_1", "contentId": "I_1",
                "fieldValues": [
                    {"fieldId": "F1", "value": {"text": "x"}},
                    {"fieldId": "F2", "value": {"text": "y"}},
                    {"fieldId": "F3", "value": {"text": "z"}}
                ]
            }),
        ),
    )?;
    add.assert();
    first.assert();
    second.assert();
    assert_eq!(third.hits(), 0, "later values must not be attempted");
    assert!(out.contains("\"isError\":true"));
    assert!(out.contains("bad value"));
    Ok(())
}

#[test]
fn create_project_field_requires_options_for_single_select() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).json_body(serde_json::json!({
            "data": {"createProjectV2Field": {"projectV2Field": {"id": "F_1", "name": "Status"}}}
        }));
    });

    let out = run_against(
        &server,
        &tool_call(
            "create-project-field",
            serde_json::json!({
                "projectId": "PVT_1", "dataType": "SINGLE_SELECT", "name": "Status"
            }),
        ),
    )?;
    assert!(out.contains("-32602"));
    assert!(out.contains("singleSelectOptions"));
    assert_eq!(m.hits(), 0);
    Ok(())
}

#[test]
fn delete_project_item_returns_deleted_id() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("deleteProjectV2Item");
        then.status(200).json_body(serde_json::json!({
            "data": {"deleteProjectV2Item": {"deletedItemId": "ITEM_9"}}
        }));
    });

    let out = run_against(
        &server,
        &tool_call(
            "delete-project-item",
            serde_json::json!({"projectId": "PVT_1", "itemId": "ITEM_9"}),
        ),
    )?;
    let sc = structured(&out);
    assert_eq!(sc["deleted_item_id"], "ITEM_9");
    Ok(())
}

#[test]
fn archive_and_unarchive_round_trip_flags() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _arch = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .body_contains("mutation ArchiveProjectItem");
        then.status(200).json_body(serde_json::json!({
            "data": {"archiveProjectV2Item": {"item": {"id": "ITEM_1", "isArchived": true}}}
        }));
    });

    let out = run_against(
        &server,
        &tool_call(
            "archive-project-item",
            serde_json::json!({"projectId": "PVT_1", "itemId": "ITEM_1"}),
        ),
    )?;
    let sc = structured(&out);
    assert_eq!(sc["archived"], true);
    assert_eq!(sc["item_id"], "ITEM_1");
    Ok(())
}

#[test]
fn get_project_items_reshapes_field_values_and_content() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(POST).path("/graphql").body_contains("GetProjectItems");
        then.status(200).json_body(serde_json::json!({
            "data": {
                "node": {
                    "items": {
                        "pageInfo": {"hasNextPage": false, "endCursor": null},
                        "nodes": [{
                            "id": "ITEM_1",
                            "type": "ISSUE",
                            "isArchived": false,
                            "fieldValues": {"nodes": [
                                {
                                    "__typename": "ProjectV2ItemFieldSingleSelectValue",
                                    "name": "In Progress",
                                    "field": {"id": "F_S", "name": "Status"}
                                },
                                {"__typename": "ProjectV2ItemFieldLabelValue"}
                            ]},
                            "content": {
                                "__typename": "Issue",
                                "id": "I_1", "title": "One", "number": 1,
                                "state": "OPEN",
                                "url": "https://github.com/o/r/issues/1",
                                "repository": {"name": "r", "owner": {"login": "o"}}
                            }
                        }]
                    }
                }
            }
        }));
    });

    let out = run_against(
        &server,
        &tool_call("get-project-items", serde_json::json!({"id": "PVT_1"})),
    )?;
    let sc = structured(&out);
    let item = &sc["items"][0];
    assert_eq!(item["id"], "ITEM_1");
    assert_eq!(item["content"]["kind"], "issue");
    assert_eq!(item["content"]["repository"], "o/r");
    let values = item["field_values"].as_array().unwrap();
    assert_eq!(values.len(), 1, "unselected value types are dropped");
    assert_eq!(values[0]["kind"], "single_select");
    assert_eq!(values[0]["value"], "In Progress");
    Ok(())
}
