use crate::config::Config;
use crate::error::Error;
use crate::http::GithubClient;
use crate::mcp;
use crate::ops::Operations;
use crate::prompts::{prompt_descriptors, render_prompt};
use crate::schema::{tool_descriptors, PROTOCOL_VERSION};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::io::{self, BufRead, Write};

// Minimal JSON-RPC 2.0 types. A literal `"id": null` deserializes to
// `Option::None`, so such requests are treated as notifications.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Id {
    Str(String),
    Num(i64),
}

#[derive(Debug, Serialize, Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Response {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn rpc_error(id: Option<Id>, code: i64, message: &str, data: Option<Value>) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.into(),
            data,
        }),
        id,
    }
}

fn rpc_ok(id: Option<Id>, result: Value) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: Some(result),
        error: None,
        id,
    }
}

/// Line-delimited JSON-RPC over stdio. The client and operation table are
/// built once before the loop; a bad environment fails the process instead of
/// failing every call.
pub async fn run_stdio_server() -> anyhow::Result<()> {
    let cfg = Config::from_env().map_err(anyhow::Error::msg)?;
    let client = GithubClient::new(cfg)?;
    let ops = Operations::new(client);
    info!(
        "starting github-projects-mcp stdio server; protocol={}",
        PROTOCOL_VERSION
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let req: Request = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                write_response(&rpc_error(None, -32700, &format!("Parse error: {}", e), None))?;
                continue;
            }
        };
        debug!("received method={}", req.method);
        if req.id.is_none() {
            // Notification; nothing is written back.
            continue;
        }
        let resp = dispatch(req, &ops).await;
        write_response(&resp)?;
    }
    Ok(())
}

fn write_response(resp: &Response) -> anyhow::Result<()> {
    let mut out = io::stdout();
    let payload = serde_json::to_string(resp)?;
    writeln!(out, "{}", payload)?;
    out.flush()?;
    Ok(())
}

async fn dispatch(req: Request, ops: &Operations) -> Response {
    match req.method.as_str() {
        "initialize" => handle_initialize(req.id),
        "tools/list" => handle_tools_list(req.id),
        "tools/call" => handle_tools_call(req.id, req.params, ops).await,
        "prompts/list" => handle_prompts_list(req.id),
        "prompts/get" => handle_prompts_get(req.id, req.params),
        "ping" => rpc_ok(req.id, serde_json::json!({})),
        other => rpc_error(
            req.id,
            -32601,
            &format!("Method not found: {}", other),
            None,
        ),
    }
}

fn handle_initialize(id: Option<Id>) -> Response {
    rpc_ok(
        id,
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "prompts": {}, "tools": {} },
            "serverInfo": {
                "name": "github-projects-mcp",
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
    )
}

fn handle_tools_list(id: Option<Id>) -> Response {
    let tools = tool_descriptors();
    rpc_ok(id, serde_json::json!({ "tools": tools }))
}

fn handle_prompts_list(id: Option<Id>) -> Response {
    rpc_ok(id, serde_json::json!({ "prompts": prompt_descriptors() }))
}

#[derive(Deserialize)]
struct PromptGetParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn handle_prompts_get(id: Option<Id>, params: Value) -> Response {
    let call: PromptGetParams = match serde_json::from_value(params) {
        Ok(c) => c,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match render_prompt(&call.name, &call.arguments) {
        Ok(result) => rpc_ok(id, result),
        Err(Error::Validation(msg)) => {
            rpc_error(id, -32602, &format!("Invalid params: {}", msg), None)
        }
        Err(e) => rpc_error(id, -32602, &e.to_string(), None),
    }
}

#[derive(Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Deserialize the arguments, run the operation, wrap the outcome. Validation
/// failures (either serde or the operation's own) are protocol errors and
/// never reach the network; upstream failures become `isError` tool results.
async fn run_tool<T, F, Fut>(id: Option<Id>, arguments: Value, op: F) -> Response
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<Value, Error>>,
{
    let input: T = match serde_json::from_value(arguments) {
        Ok(v) => v,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    match op(input).await {
        Ok(structured) => rpc_ok(id, mcp::wrap(structured)),
        Err(Error::Validation(msg)) => {
            rpc_error(id, -32602, &format!("Invalid params: {}", msg), None)
        }
        Err(e) => {
            warn!("tool call failed: {}", e);
            rpc_ok(id, mcp::wrap_error(&e))
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PingInput {
    message: Option<String>,
}

async fn handle_tools_call(id: Option<Id>, params: Value, ops: &Operations) -> Response {
    let call: ToolCallParams = match serde_json::from_value(params) {
        Ok(c) => c,
        Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
    };
    let args = call.arguments;
    match call.name.as_str() {
        "ping" => {
            run_tool(id, args, |i: PingInput| async move {
                let message = i.message.unwrap_or_else(|| "pong".to_string());
                Ok(serde_json::json!({ "message": message }))
            })
            .await
        }
        "get-repository" => run_tool(id, args, |i| ops.repos.get_repository(i)).await,
        "list-repositories" => run_tool(id, args, |i| ops.repos.list_repositories(i)).await,
        "get-issue" => run_tool(id, args, |i| ops.issues.get_issue(i)).await,
        "list-issues" => run_tool(id, args, |i| ops.issues.list_issues(i)).await,
        "create-issue" => run_tool(id, args, |i| ops.issues.create_issue(i)).await,
        "update-issue" => run_tool(id, args, |i| ops.issues.update_issue(i)).await,
        "get-project" => run_tool(id, args, |i| ops.projects.get_project(i)).await,
        "list-projects" => run_tool(id, args, |i| ops.projects.list_projects(i)).await,
        "get-project-columns" => run_tool(id, args, |i| ops.projects.get_project_columns(i)).await,
        "get-project-fields" => run_tool(id, args, |i| ops.projects.get_project_fields(i)).await,
        "get-project-items" => run_tool(id, args, |i| ops.projects.get_project_items(i)).await,
        "create-project-item" => run_tool(id, args, |i| ops.projects.create_project_item(i)).await,
        "update-project-item-field" => {
            run_tool(id, args, |i| ops.projects.update_project_item_field(i)).await
        }
        "bulk-update-project-item-field" => {
            run_tool(id, args, |i| ops.projects.bulk_update_project_item_field(i)).await
        }
        "create-project" => run_tool(id, args, |i| ops.projects.create_project(i)).await,
        "update-project" => run_tool(id, args, |i| ops.projects.update_project(i)).await,
        "delete-project" => run_tool(id, args, |i| ops.projects.delete_project(i)).await,
        "copy-project" => run_tool(id, args, |i| ops.projects.copy_project(i)).await,
        "add-draft-issue" => run_tool(id, args, |i| ops.projects.add_draft_issue(i)).await,
        "convert-draft-issue" => run_tool(id, args, |i| ops.projects.convert_draft_issue(i)).await,
        "add-item-to-project" => run_tool(id, args, |i| ops.projects.add_item_to_project(i)).await,
        "update-item-position" => {
            run_tool(id, args, |i| ops.projects.update_item_position(i)).await
        }
        "delete-project-item" => run_tool(id, args, |i| ops.projects.delete_project_item(i)).await,
        "create-project-field" => {
            run_tool(id, args, |i| ops.projects.create_project_field(i)).await
        }
        "update-project-field" => {
            run_tool(id, args, |i| ops.projects.update_project_field(i)).await
        }
        "delete-project-field" => {
            run_tool(id, args, |i| ops.projects.delete_project_field(i)).await
        }
        "update-project-status" => {
            run_tool(id, args, |i| ops.projects.update_project_status(i)).await
        }
        "archive-project-item" => {
            run_tool(id, args, |i| ops.projects.archive_project_item(i)).await
        }
        "unarchive-project-item" => {
            run_tool(id, args, |i| ops.projects.unarchive_project_item(i)).await
        }
        "clear-item-field-value" => {
            run_tool(id, args, |i| ops.projects.clear_item_field_value(i)).await
        }
        "mark-project-as-template" => {
            run_tool(id, args, |i| ops.projects.mark_project_as_template(i)).await
        }
        "unmark-project-as-template" => {
            run_tool(id, args, |i| ops.projects.unmark_project_as_template(i)).await
        }
        other => {
            let e = Error::UnknownTool(other.to_string());
            rpc_error(id, -32601, &e.to_string(), None)
        }
    }
}
