use crate::error::Error;
use crate::http::{encode_path_segment, GithubClient};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::resolve_owner;

// Single-issue reads use GraphQL for the nested shape in one round trip;
// list/create/update use REST, whose filtering is richer for issues.
const GET_ISSUE: &str = r#"
query GetIssue($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) {
      id
      number
      title
      body
      state
      createdAt
      updatedAt
      closedAt
      url
      author { login }
      assignees(first: 10) { nodes { login } }
      labels(first: 20) { nodes { name color } }
      milestone { title state dueOn }
      comments { totalCount }
    }
  }
}
"#;

pub struct IssueOps {
    client: GithubClient,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetIssueInput {
    pub repo: String,
    pub number: i64,
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListIssuesInput {
    pub repo: String,
    pub owner: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
    pub labels: Option<Vec<String>>,
    pub assignee: Option<String>,
    pub milestone: Option<String>,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_state() -> String {
    "open".into()
}
fn default_sort() -> String {
    "created".into()
}
fn default_direction() -> String {
    "desc".into()
}
fn default_per_page() -> u32 {
    30
}
fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIssueInput {
    pub repo: String,
    pub title: String,
    pub owner: Option<String>,
    pub body: Option<String>,
    pub assignees: Option<Vec<String>>,
    pub milestone: Option<i64>,
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateIssueInput {
    pub repo: String,
    #[serde(rename = "issueNumber")]
    pub issue_number: i64,
    pub owner: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<String>,
    pub assignees: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    // Absent = leave unchanged; explicit null = clear the milestone.
    #[serde(default, deserialize_with = "double_option")]
    pub milestone: Option<Option<i64>>,
}

fn double_option<'de, D>(de: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(de).map(Some)
}

// GraphQL issue node, reshaped into the stable output below.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    id: String,
    number: i64,
    title: String,
    body: Option<String>,
    state: String,
    created_at: String,
    updated_at: String,
    closed_at: Option<String>,
    url: String,
    author: Option<Login>,
    assignees: Nodes<Login>,
    labels: Nodes<LabelNode>,
    milestone: Option<MilestoneNode>,
    comments: TotalCount,
}

#[derive(Debug, Deserialize)]
struct Login {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MilestoneNode {
    title: String,
    state: String,
    due_on: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: i64,
}

#[derive(Debug, Serialize)]
pub struct LabelItem {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct MilestoneItem {
    pub title: String,
    pub state: String,
    pub due_on: Option<String>,
}

/// Stable issue shape: id, number, title, body, state, timestamps, author,
/// assignees, labels, milestone, comment count.
#[derive(Debug, Serialize)]
pub struct IssueDetail {
    pub id: String,
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub url: String,
    pub author: Option<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<LabelItem>,
    pub milestone: Option<MilestoneItem>,
    pub comments: i64,
}

// REST issue object (list endpoint), reshaped to the same stable shape.
#[derive(Debug, Deserialize)]
struct RestIssue {
    node_id: String,
    number: i64,
    title: String,
    body: Option<String>,
    state: String,
    created_at: String,
    updated_at: String,
    closed_at: Option<String>,
    html_url: String,
    user: Option<RestUser>,
    #[serde(default)]
    assignees: Vec<RestUser>,
    #[serde(default)]
    labels: Vec<RestLabel>,
    milestone: Option<RestMilestone>,
    comments: i64,
}

#[derive(Debug, Deserialize)]
struct RestUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RestLabel {
    name: String,
    #[serde(default)]
    color: String,
}

#[derive(Debug, Deserialize)]
struct RestMilestone {
    title: String,
    state: String,
    due_on: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreatedIssue {
    pub id: i64,
    pub node_id: String,
    pub number: i64,
    pub title: String,
    pub state: String,
    pub html_url: String,
}

impl IssueOps {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }

    pub async fn get_issue(&self, input: GetIssueInput) -> Result<Value, Error> {
        let owner = resolve_owner(input.owner, self.client.default_owner(), "owner")?;
        let data = self
            .client
            .graphql(
                GET_ISSUE,
                serde_json::json!({ "owner": owner, "repo": input.repo, "number": input.number }),
            )
            .await?;
        let node = data
            .get("repository")
            .and_then(|r| r.get("issue"))
            .cloned()
            .filter(|v| !v.is_null());
        let Some(node) = node else {
            return Err(Error::NotFound(format!(
                "Issue #{} not found in {}/{}",
                input.number, owner, input.repo
            )));
        };
        let issue: IssueNode = serde_json::from_value(node)
            .map_err(|e| Error::Upstream(format!("unexpected issue shape: {}", e)))?;
        Ok(serde_json::json!({ "issue": reshape_graphql_issue(issue) }))
    }

    pub async fn list_issues(&self, input: ListIssuesInput) -> Result<Value, Error> {
        let owner = resolve_owner(input.owner, self.client.default_owner(), "owner")?;
        let path = format!(
            "/repos/{}/{}/issues",
            encode_path_segment(&owner),
            encode_path_segment(&input.repo)
        );
        let mut query = vec![
            ("state", input.state),
            ("sort", input.sort),
            ("direction", input.direction),
            ("per_page", input.per_page.to_string()),
            ("page", input.page.to_string()),
        ];
        if let Some(labels) = input.labels.filter(|l| !l.is_empty()) {
            query.push(("labels", labels.join(",")));
        }
        if let Some(assignee) = input.assignee {
            query.push(("assignee", assignee));
        }
        if let Some(milestone) = input.milestone {
            query.push(("milestone", milestone));
        }
        let raw = self.client.rest(Method::GET, &path, &query, None).await?;
        let issues: Vec<RestIssue> = serde_json::from_value(raw)
            .map_err(|e| Error::Upstream(format!("unexpected issue list shape: {}", e)))?;
        let items: Vec<IssueDetail> = issues.into_iter().map(reshape_rest_issue).collect();
        Ok(serde_json::json!({ "issues": items }))
    }

    pub async fn create_issue(&self, input: CreateIssueInput) -> Result<Value, Error> {
        let owner = resolve_owner(input.owner, self.client.default_owner(), "owner")?;
        let path = format!(
            "/repos/{}/{}/issues",
            encode_path_segment(&owner),
            encode_path_segment(&input.repo)
        );
        let mut payload = serde_json::Map::new();
        payload.insert("title".into(), Value::String(input.title));
        if let Some(body) = input.body {
            payload.insert("body".into(), Value::String(body));
        }
        if let Some(assignees) = input.assignees.filter(|a| !a.is_empty()) {
            payload.insert("assignees".into(), serde_json::json!(assignees));
        }
        if let Some(milestone) = input.milestone {
            payload.insert("milestone".into(), serde_json::json!(milestone));
        }
        if let Some(labels) = input.labels.filter(|l| !l.is_empty()) {
            payload.insert("labels".into(), serde_json::json!(labels));
        }
        let raw = self
            .client
            .rest(Method::POST, &path, &[], Some(&Value::Object(payload)))
            .await?;
        let created: CreatedIssue = serde_json::from_value(raw)
            .map_err(|e| Error::Upstream(format!("unexpected created-issue shape: {}", e)))?;
        Ok(serde_json::json!({ "issue": created }))
    }

    pub async fn update_issue(&self, input: UpdateIssueInput) -> Result<Value, Error> {
        let owner = resolve_owner(input.owner, self.client.default_owner(), "owner")?;
        let path = format!(
            "/repos/{}/{}/issues/{}",
            encode_path_segment(&owner),
            encode_path_segment(&input.repo),
            input.issue_number
        );
        let mut payload = serde_json::Map::new();
        if let Some(title) = input.title {
            payload.insert("title".into(), Value::String(title));
        }
        if let Some(body) = input.body {
            payload.insert("body".into(), Value::String(body));
        }
        if let Some(state) = input.state {
            payload.insert("state".into(), Value::String(state));
        }
        if let Some(assignees) = input.assignees {
            payload.insert("assignees".into(), serde_json::json!(assignees));
        }
        if let Some(labels) = input.labels {
            payload.insert("labels".into(), serde_json::json!(labels));
        }
        if let Some(milestone) = input.milestone {
            payload.insert("milestone".into(), serde_json::json!(milestone));
        }
        if payload.is_empty() {
            return Err(Error::Validation(
                "at least one field to update must be supplied".into(),
            ));
        }
        let raw = self
            .client
            .rest(Method::PATCH, &path, &[], Some(&Value::Object(payload)))
            .await?;
        let updated: CreatedIssue = serde_json::from_value(raw)
            .map_err(|e| Error::Upstream(format!("unexpected updated-issue shape: {}", e)))?;
        Ok(serde_json::json!({ "issue": updated }))
    }
}

fn reshape_graphql_issue(issue: IssueNode) -> IssueDetail {
    IssueDetail {
        id: issue.id,
        number: issue.number,
        title: issue.title,
        body: issue.body,
        state: issue.state,
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        url: issue.url,
        author: issue.author.map(|a| a.login),
        assignees: issue.assignees.nodes.into_iter().map(|a| a.login).collect(),
        labels: issue
            .labels
            .nodes
            .into_iter()
            .map(|l| LabelItem {
                name: l.name,
                color: l.color,
            })
            .collect(),
        milestone: issue.milestone.map(|m| MilestoneItem {
            title: m.title,
            state: m.state,
            due_on: m.due_on,
        }),
        comments: issue.comments.total_count,
    }
}

fn reshape_rest_issue(issue: RestIssue) -> IssueDetail {
    IssueDetail {
        id: issue.node_id,
        number: issue.number,
        title: issue.title,
        body: issue.body,
        state: issue.state,
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        url: issue.html_url,
        author: issue.user.map(|u| u.login),
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
        labels: issue
            .labels
            .into_iter()
            .map(|l| LabelItem {
                name: l.name,
                color: l.color,
            })
            .collect(),
        milestone: issue.milestone.map(|m| MilestoneItem {
            title: m.title,
            state: m.state,
            due_on: m.due_on,
        }),
        comments: issue.comments,
    }
}
