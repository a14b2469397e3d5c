use crate::error::Error;
use crate::http::{encode_path_segment, GithubClient};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::resolve_owner;

// Rich single-repository read goes through GraphQL for the nested shape;
// the list goes through REST for its filtering and pagination parameters.
const GET_REPOSITORY: &str = r#"
query GetRepository($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    id
    name
    nameWithOwner
    description
    url
    isPrivate
    isArchived
    isFork
    stargazerCount
    forkCount
    createdAt
    updatedAt
    pushedAt
    defaultBranchRef { name }
    primaryLanguage { name }
    licenseInfo { name spdxId }
  }
}
"#;

pub struct RepositoryOps {
    client: GithubClient,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetRepositoryInput {
    pub name: String,
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListRepositoriesInput {
    pub owner: Option<String>,
    #[serde(default = "default_type", rename = "type")]
    pub repo_type: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_type() -> String {
    "all".into()
}
fn default_sort() -> String {
    "full_name".into()
}
fn default_direction() -> String {
    "asc".into()
}
fn default_per_page() -> u32 {
    30
}
fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    id: String,
    name: String,
    name_with_owner: String,
    description: Option<String>,
    url: String,
    is_private: bool,
    is_archived: bool,
    is_fork: bool,
    stargazer_count: i64,
    fork_count: i64,
    created_at: String,
    updated_at: String,
    pushed_at: Option<String>,
    default_branch_ref: Option<NameRef>,
    primary_language: Option<NameRef>,
    license_info: Option<LicenseRef>,
}

#[derive(Debug, Deserialize)]
struct NameRef {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LicenseRef {
    name: String,
    spdx_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RepositoryDetail {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub private: bool,
    pub archived: bool,
    pub fork: bool,
    pub stargazers: i64,
    pub forks: i64,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: Option<String>,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub license: Option<String>,
}

// Subset of the REST repository object we surface to callers.
#[derive(Debug, Deserialize)]
struct RestRepo {
    id: i64,
    node_id: String,
    name: String,
    full_name: String,
    description: Option<String>,
    html_url: String,
    private: bool,
    fork: bool,
    archived: bool,
    language: Option<String>,
    stargazers_count: i64,
    forks_count: i64,
    open_issues_count: i64,
    default_branch: String,
    created_at: String,
    updated_at: String,
    pushed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RepositoryItem {
    pub id: i64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub private: bool,
    pub fork: bool,
    pub archived: bool,
    pub language: Option<String>,
    pub stargazers: i64,
    pub forks: i64,
    pub open_issues: i64,
    pub default_branch: String,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: Option<String>,
}

impl RepositoryOps {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }

    pub async fn get_repository(&self, input: GetRepositoryInput) -> Result<Value, Error> {
        let owner = resolve_owner(input.owner, self.client.default_owner(), "owner")?;
        let data = self
            .client
            .graphql(
                GET_REPOSITORY,
                serde_json::json!({ "owner": owner, "name": input.name }),
            )
            .await?;
        let node: Option<RepositoryNode> = data
            .get("repository")
            .cloned()
            .filter(|v| !v.is_null())
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::Upstream(format!("unexpected repository shape: {}", e)))?;
        let Some(repo) = node else {
            return Err(Error::NotFound(format!("Repository {}/{} not found", owner, input.name)));
        };
        let detail = RepositoryDetail {
            id: repo.id,
            name: repo.name,
            full_name: repo.name_with_owner,
            description: repo.description,
            url: repo.url,
            private: repo.is_private,
            archived: repo.is_archived,
            fork: repo.is_fork,
            stargazers: repo.stargazer_count,
            forks: repo.fork_count,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            pushed_at: repo.pushed_at,
            default_branch: repo.default_branch_ref.map(|r| r.name),
            language: repo.primary_language.map(|l| l.name),
            license: repo.license_info.map(|l| l.spdx_id.unwrap_or(l.name)),
        };
        Ok(serde_json::json!({ "repository": detail }))
    }

    pub async fn list_repositories(&self, input: ListRepositoriesInput) -> Result<Value, Error> {
        let owner = resolve_owner(input.owner, self.client.default_owner(), "owner")?;
        let path = format!("/users/{}/repos", encode_path_segment(&owner));
        let query = vec![
            ("type", input.repo_type),
            ("sort", input.sort),
            ("direction", input.direction),
            ("per_page", input.per_page.to_string()),
            ("page", input.page.to_string()),
        ];
        let raw = self.client.rest(Method::GET, &path, &query, None).await?;
        let repos: Vec<RestRepo> = serde_json::from_value(raw)
            .map_err(|e| Error::Upstream(format!("unexpected repository list shape: {}", e)))?;
        let items: Vec<RepositoryItem> = repos
            .into_iter()
            .map(|r| RepositoryItem {
                id: r.id,
                node_id: r.node_id,
                name: r.name,
                full_name: r.full_name,
                description: r.description,
                url: r.html_url,
                private: r.private,
                fork: r.fork,
                archived: r.archived,
                language: r.language,
                stargazers: r.stargazers_count,
                forks: r.forks_count,
                open_issues: r.open_issues_count,
                default_branch: r.default_branch,
                created_at: r.created_at,
                updated_at: r.updated_at,
                pushed_at: r.pushed_at,
            })
            .collect();
        Ok(serde_json::json!({ "repositories": items }))
    }
}
