use crate::error::Error;
use crate::http::GithubClient;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use super::{mutation_id, resolve_owner};

// Projects v2 has no REST surface; every operation here is GraphQL.
// Document text is a static constant per operation.

const GET_PROJECT: &str = r#"
query GetProject($id: ID!) {
  node(id: $id) {
    ... on ProjectV2 {
      id
      title
      shortDescription
      url
      number
      creator { login }
      public
      closed
      template
      createdAt
      updatedAt
    }
  }
}
"#;

const LIST_PROJECTS: &str = r#"
query ListProjects($login: String!, $first: Int!, $after: String) {
  user(login: $login) {
    projectsV2(first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes {
        id
        title
        shortDescription
        url
        number
        closed
        createdAt
        updatedAt
      }
    }
  }
}
"#;

const GET_PROJECT_COLUMNS: &str = r#"
query GetProjectColumns($id: ID!) {
  node(id: $id) {
    ... on ProjectV2 {
      fields(first: 20) {
        nodes {
          ... on ProjectV2SingleSelectField {
            id
            name
            options { id name color }
          }
        }
      }
    }
  }
}
"#;

const GET_PROJECT_FIELDS: &str = r#"
query GetProjectFields($id: ID!) {
  node(id: $id) {
    ... on ProjectV2 {
      fields(first: 50) {
        nodes {
          __typename
          ... on ProjectV2Field {
            id
            name
            dataType
          }
          ... on ProjectV2IterationField {
            id
            name
            dataType
            configuration {
              iterations { id title startDate duration }
            }
          }
          ... on ProjectV2SingleSelectField {
            id
            name
            dataType
            options { id name color }
          }
        }
      }
    }
  }
}
"#;

const GET_PROJECT_ITEMS: &str = r#"
query GetProjectItems($id: ID!, $first: Int!, $after: String) {
  node(id: $id) {
    ... on ProjectV2 {
      items(first: $first, after: $after) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          type
          isArchived
          fieldValues(first: 20) {
            nodes {
              __typename
              ... on ProjectV2ItemFieldTextValue {
                text
                field { ... on ProjectV2FieldCommon { name id } }
              }
              ... on ProjectV2ItemFieldDateValue {
                date
                field { ... on ProjectV2FieldCommon { name id } }
              }
              ... on ProjectV2ItemFieldSingleSelectValue {
                name
                field { ... on ProjectV2FieldCommon { name id } }
              }
              ... on ProjectV2ItemFieldNumberValue {
                number
                field { ... on ProjectV2FieldCommon { name id } }
              }
              ... on ProjectV2ItemFieldIterationValue {
                title
                startDate
                duration
                field { ... on ProjectV2FieldCommon { name id } }
              }
            }
          }
          content {
            __typename
            ... on Issue {
              id
              title
              number
              state
              url
              repository { name owner { login } }
            }
            ... on PullRequest {
              id
              title
              number
              state
              url
              repository { name owner { login } }
            }
            ... on DraftIssue {
              id
              title
            }
          }
        }
      }
    }
  }
}
"#;

const ADD_ITEM_BY_ID: &str = r#"
mutation AddProjectItem($input: AddProjectV2ItemByIdInput!) {
  addProjectV2ItemById(input: $input) {
    item { id }
  }
}
"#;

const UPDATE_ITEM_FIELD_VALUE: &str = r#"
mutation UpdateProjectItemField($input: UpdateProjectV2ItemFieldValueInput!) {
  updateProjectV2ItemFieldValue(input: $input) {
    projectV2Item { id }
  }
}
"#;

const CREATE_PROJECT: &str = r#"
mutation CreateProject($input: CreateProjectV2Input!) {
  createProjectV2(input: $input) {
    projectV2 { id title url number closed }
  }
}
"#;

const UPDATE_PROJECT: &str = r#"
mutation UpdateProject($input: UpdateProjectV2Input!) {
  updateProjectV2(input: $input) {
    projectV2 { id title shortDescription public closed }
  }
}
"#;

const DELETE_PROJECT: &str = r#"
mutation DeleteProject($input: DeleteProjectV2Input!) {
  deleteProjectV2(input: $input) {
    projectV2 { id }
  }
}
"#;

const COPY_PROJECT: &str = r#"
mutation CopyProject($input: CopyProjectV2Input!) {
  copyProjectV2(input: $input) {
    projectV2 { id title }
  }
}
"#;

const ADD_DRAFT_ISSUE: &str = r#"
mutation AddDraftIssue($input: AddProjectV2DraftIssueInput!) {
  addProjectV2DraftIssue(input: $input) {
    projectItem { id }
  }
}
"#;

const CONVERT_DRAFT_ISSUE: &str = r#"
mutation ConvertDraftIssue($input: ConvertProjectV2DraftIssueItemToIssueInput!) {
  convertProjectV2DraftIssueItemToIssue(input: $input) {
    item { id }
  }
}
"#;

const UPDATE_ITEM_POSITION: &str = r#"
mutation UpdateItemPosition($input: UpdateProjectV2ItemPositionInput!) {
  updateProjectV2ItemPosition(input: $input) {
    clientMutationId
  }
}
"#;

const DELETE_PROJECT_ITEM: &str = r#"
mutation DeleteProjectItem($input: DeleteProjectV2ItemInput!) {
  deleteProjectV2Item(input: $input) {
    deletedItemId
  }
}
"#;

const CREATE_PROJECT_FIELD: &str = r#"
mutation CreateProjectField($input: CreateProjectV2FieldInput!) {
  createProjectV2Field(input: $input) {
    projectV2Field {
      ... on ProjectV2FieldCommon { id name }
    }
  }
}
"#;

const UPDATE_PROJECT_FIELD: &str = r#"
mutation UpdateProjectField($input: UpdateProjectV2FieldInput!) {
  updateProjectV2Field(input: $input) {
    projectV2Field {
      ... on ProjectV2FieldCommon { id name }
    }
  }
}
"#;

const DELETE_PROJECT_FIELD: &str = r#"
mutation DeleteProjectField($input: DeleteProjectV2FieldInput!) {
  deleteProjectV2Field(input: $input) {
    projectV2Field {
      ... on ProjectV2FieldCommon { id }
    }
  }
}
"#;

const UPDATE_PROJECT_STATUS: &str = r#"
mutation UpdateProjectStatus($input: UpdateProjectV2StatusUpdateInput!) {
  updateProjectV2StatusUpdate(input: $input) {
    statusUpdate { id status body startDate targetDate }
  }
}
"#;

const ARCHIVE_ITEM: &str = r#"
mutation ArchiveProjectItem($input: ArchiveProjectV2ItemInput!) {
  archiveProjectV2Item(input: $input) {
    item { id isArchived }
  }
}
"#;

const UNARCHIVE_ITEM: &str = r#"
mutation UnarchiveProjectItem($input: UnarchiveProjectV2ItemInput!) {
  unarchiveProjectV2Item(input: $input) {
    item { id isArchived }
  }
}
"#;

const CLEAR_ITEM_FIELD_VALUE: &str = r#"
mutation ClearProjectItemField($input: ClearProjectV2ItemFieldValueInput!) {
  clearProjectV2ItemFieldValue(input: $input) {
    projectV2Item { id }
  }
}
"#;

const MARK_AS_TEMPLATE: &str = r#"
mutation MarkProjectAsTemplate($input: MarkProjectV2AsTemplateInput!) {
  markProjectV2AsTemplate(input: $input) {
    projectV2 { id template }
  }
}
"#;

const UNMARK_AS_TEMPLATE: &str = r#"
mutation UnmarkProjectAsTemplate($input: UnmarkProjectV2AsTemplateInput!) {
  unmarkProjectV2AsTemplate(input: $input) {
    projectV2 { id template }
  }
}
"#;

/// A project-item field value. Exactly one alternative exists by
/// construction; validation is the parse step that produces the variant, so
/// an invalid multi-populated value never exists, even transiently.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(String),
    SingleSelectOptionId(String),
    IterationId(String),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFieldValue {
    text: Option<String>,
    number: Option<f64>,
    date: Option<String>,
    #[serde(rename = "singleSelectOptionId")]
    single_select_option_id: Option<String>,
    #[serde(rename = "iterationId")]
    iteration_id: Option<String>,
}

impl TryFrom<RawFieldValue> for FieldValue {
    type Error = String;

    fn try_from(raw: RawFieldValue) -> Result<Self, String> {
        // Empty strings count as unset, same as absent keys.
        let mut set = Vec::new();
        if let Some(t) = raw.text.filter(|s| !s.is_empty()) {
            set.push(FieldValue::Text(t));
        }
        if let Some(n) = raw.number {
            set.push(FieldValue::Number(n));
        }
        if let Some(d) = raw.date.filter(|s| !s.is_empty()) {
            set.push(FieldValue::Date(d));
        }
        if let Some(s) = raw.single_select_option_id.filter(|s| !s.is_empty()) {
            set.push(FieldValue::SingleSelectOptionId(s));
        }
        if let Some(i) = raw.iteration_id.filter(|s| !s.is_empty()) {
            set.push(FieldValue::IterationId(i));
        }
        if set.len() == 1 {
            Ok(set.remove(0))
        } else {
            Err(
                "exactly one of `text`, `number`, `date`, `singleSelectOptionId`, `iterationId` \
                 must be provided in `value`"
                    .to_string(),
            )
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawFieldValue::deserialize(de)?;
        FieldValue::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FieldValue {
    // Emit a single-key object so the mutation variable carries exactly one
    // alternative, never a sparse object with unrelated nulls.
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = s.serialize_map(Some(1))?;
        match self {
            FieldValue::Text(v) => map.serialize_entry("text", v)?,
            FieldValue::Number(v) => map.serialize_entry("number", v)?,
            FieldValue::Date(v) => map.serialize_entry("date", v)?,
            FieldValue::SingleSelectOptionId(v) => map.serialize_entry("singleSelectOptionId", v)?,
            FieldValue::IterationId(v) => map.serialize_entry("iterationId", v)?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldDataType {
    Text,
    Number,
    Date,
    SingleSelect,
    Iteration,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionColor {
    Gray,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
    Pink,
    Purple,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SingleSelectOptionInput {
    pub name: String,
    pub description: String,
    pub color: OptionColor,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IterationInput {
    pub title: String,
    pub start_date: String,
    pub duration: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IterationConfigurationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iterations: Vec<IterationInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusUpdateStatus {
    Inactive,
    OnTrack,
    AtRisk,
    OffTrack,
    Complete,
}

// ---- tool inputs -----------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetProjectInput {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListProjectsInput {
    pub login: Option<String>,
    #[serde(default = "default_first")]
    pub first: u32,
    pub after: Option<String>,
}

fn default_first() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectIdInput {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetProjectItemsInput {
    pub id: String,
    #[serde(default = "default_first")]
    pub first: u32,
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectItemInput {
    pub project_id: String,
    pub content_id: String,
    #[serde(default)]
    pub field_values: Vec<CreateItemFieldValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateItemFieldValue {
    pub field_id: String,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateItemFieldInput {
    pub project_id: String,
    pub item_id: String,
    pub field_id: String,
    pub value: FieldValue,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BulkUpdateItemFieldInput {
    pub project_id: String,
    pub item_ids: Vec<String>,
    pub field_id: String,
    pub value: FieldValue,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectInput {
    pub owner_id: String,
    pub title: String,
    pub repository_id: Option<String>,
    pub team_id: Option<String>,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProjectInput {
    pub project_id: String,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub public: Option<bool>,
    pub closed: Option<bool>,
    pub readme: Option<String>,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteProjectInput {
    pub project_id: String,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CopyProjectInput {
    pub project_id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub include_draft_issues: bool,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddDraftIssueInput {
    pub project_id: String,
    pub title: String,
    pub body: Option<String>,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConvertDraftIssueInput {
    pub item_id: String,
    pub repository_id: String,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddItemToProjectInput {
    pub project_id: String,
    pub content_id: String,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateItemPositionInput {
    pub project_id: String,
    pub item_id: String,
    // Omitted = move the item to the top.
    pub after_id: Option<String>,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteProjectItemInput {
    pub project_id: String,
    pub item_id: String,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectFieldInput {
    pub project_id: String,
    pub data_type: FieldDataType,
    pub name: String,
    #[serde(default)]
    pub single_select_options: Vec<SingleSelectOptionInput>,
    pub iteration_configuration: Option<IterationConfigurationInput>,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProjectFieldInput {
    pub field_id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub single_select_options: Vec<SingleSelectOptionInput>,
    pub iteration_configuration: Option<IterationConfigurationInput>,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteProjectFieldInput {
    pub field_id: String,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProjectStatusInput {
    pub status_update_id: String,
    pub body: Option<String>,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
    pub status: Option<StatusUpdateStatus>,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemInProjectInput {
    pub project_id: String,
    pub item_id: String,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClearItemFieldInput {
    pub project_id: String,
    pub item_id: String,
    pub field_id: String,
    pub client_mutation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectTemplateInput {
    pub project_id: String,
    pub client_mutation_id: Option<String>,
}

// ---- outputs ---------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageInfoNode {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectNode {
    id: String,
    title: String,
    short_description: Option<String>,
    url: String,
    number: i64,
    #[serde(default)]
    creator: Option<LoginNode>,
    #[serde(default)]
    public: Option<bool>,
    closed: bool,
    #[serde(default)]
    template: Option<bool>,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Deserialize)]
struct LoginNode {
    login: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub id: String,
    pub title: String,
    pub short_description: Option<String>,
    pub url: String,
    pub number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<bool>,
    pub created_at: String,
    pub updated_at: String,
}

/// Per-item outcome of a bulk field update. One entry per requested item id,
/// in the requested order, regardless of individual failures.
#[derive(Debug, Serialize)]
pub struct BulkItemResult {
    pub item_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum FieldNode {
    #[serde(rename = "ProjectV2Field")]
    Plain {
        id: String,
        name: String,
        #[serde(rename = "dataType")]
        data_type: String,
    },
    #[serde(rename = "ProjectV2IterationField")]
    Iteration {
        id: String,
        name: String,
        #[serde(rename = "dataType")]
        data_type: String,
        configuration: IterationConfigurationNode,
    },
    #[serde(rename = "ProjectV2SingleSelectField")]
    SingleSelect {
        id: String,
        name: String,
        #[serde(rename = "dataType")]
        data_type: String,
        options: Vec<SelectOptionNode>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct IterationConfigurationNode {
    iterations: Vec<IterationNode>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct IterationNode {
    id: String,
    title: String,
    start_date: String,
    duration: i64,
}

#[derive(Debug, Deserialize, Serialize)]
struct SelectOptionNode {
    id: String,
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum ItemFieldValueNode {
    #[serde(rename = "ProjectV2ItemFieldTextValue")]
    Text {
        text: Option<String>,
        field: FieldRef,
    },
    #[serde(rename = "ProjectV2ItemFieldDateValue")]
    Date {
        date: Option<String>,
        field: FieldRef,
    },
    #[serde(rename = "ProjectV2ItemFieldSingleSelectValue")]
    SingleSelect {
        name: Option<String>,
        field: FieldRef,
    },
    #[serde(rename = "ProjectV2ItemFieldNumberValue")]
    Number {
        number: Option<f64>,
        field: FieldRef,
    },
    #[serde(rename = "ProjectV2ItemFieldIterationValue")]
    Iteration {
        title: Option<String>,
        #[serde(rename = "startDate")]
        start_date: Option<String>,
        duration: Option<i64>,
        field: FieldRef,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct FieldRef {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum ContentNode {
    Issue(ContentDetails),
    PullRequest(ContentDetails),
    DraftIssue {
        id: String,
        title: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    id: String,
    title: String,
    number: i64,
    state: String,
    url: String,
    repository: RepositoryRef,
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    name: String,
    owner: LoginNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemNode {
    id: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    is_archived: bool,
    field_values: FieldValuesConn,
    content: Option<ContentNode>,
}

#[derive(Debug, Deserialize)]
struct FieldValuesConn {
    nodes: Vec<ItemFieldValueNode>,
}

#[derive(Debug, Serialize)]
pub struct ItemFieldValue {
    pub field_id: String,
    pub field_name: String,
    pub kind: &'static str,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct ItemContent {
    pub kind: &'static str,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ItemContent>,
    pub field_values: Vec<ItemFieldValue>,
}

// ---- operations ------------------------------------------------------------

pub struct ProjectOps {
    client: GithubClient,
}

impl ProjectOps {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }

    pub async fn get_project(&self, input: GetProjectInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(GET_PROJECT, serde_json::json!({ "id": input.id }))
            .await?;
        let node = data.get("node").cloned().filter(|v| !v.is_null());
        let Some(node) = node else {
            return Err(Error::NotFound(format!("Project {} not found", input.id)));
        };
        let project: ProjectNode = serde_json::from_value(node)
            .map_err(|e| Error::Upstream(format!("unexpected project shape: {}", e)))?;
        Ok(serde_json::json!({ "project": reshape_project(project) }))
    }

    pub async fn list_projects(&self, input: ListProjectsInput) -> Result<Value, Error> {
        let login = resolve_owner(input.login, self.client.default_owner(), "login")?;
        let data = self
            .client
            .graphql(
                LIST_PROJECTS,
                serde_json::json!({
                    "login": login,
                    "first": input.first.min(100),
                    "after": input.after,
                }),
            )
            .await?;
        let conn = data
            .get("user")
            .and_then(|u| u.get("projectsV2"))
            .cloned()
            .filter(|v| !v.is_null());
        let Some(conn) = conn else {
            // No such login, or the token cannot see it.
            return Ok(serde_json::json!({
                "projects": [],
                "page_info": PageInfo { has_next_page: false, end_cursor: None },
            }));
        };
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Conn {
            page_info: PageInfoNode,
            nodes: Vec<ProjectNode>,
        }
        let conn: Conn = serde_json::from_value(conn)
            .map_err(|e| Error::Upstream(format!("unexpected project list shape: {}", e)))?;
        let projects: Vec<ProjectDetail> = conn.nodes.into_iter().map(reshape_project).collect();
        Ok(serde_json::json!({
            "projects": projects,
            "page_info": PageInfo {
                has_next_page: conn.page_info.has_next_page,
                end_cursor: conn.page_info.end_cursor,
            },
        }))
    }

    pub async fn get_project_columns(&self, input: ProjectIdInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(GET_PROJECT_COLUMNS, serde_json::json!({ "id": input.id }))
            .await?;
        let nodes = data
            .pointer("/node/fields/nodes")
            .and_then(|n| n.as_array())
            .cloned()
            .unwrap_or_default();
        // Single-select fields are the ones that act as status columns; the
        // query returns empty objects for every other field type.
        let columns: Vec<Value> = nodes
            .into_iter()
            .filter(|n| n.get("options").is_some())
            .collect();
        Ok(serde_json::json!({ "columns": columns }))
    }

    pub async fn get_project_fields(&self, input: ProjectIdInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(GET_PROJECT_FIELDS, serde_json::json!({ "id": input.id }))
            .await?;
        let nodes = data
            .pointer("/node/fields/nodes")
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        let nodes: Vec<FieldNode> = serde_json::from_value(nodes)
            .map_err(|e| Error::Upstream(format!("unexpected field list shape: {}", e)))?;
        let fields: Vec<Value> = nodes
            .into_iter()
            .filter_map(|f| match f {
                FieldNode::Plain { id, name, data_type } => Some(serde_json::json!({
                    "id": id, "name": name, "data_type": data_type,
                })),
                FieldNode::Iteration {
                    id,
                    name,
                    data_type,
                    configuration,
                } => Some(serde_json::json!({
                    "id": id, "name": name, "data_type": data_type,
                    "iterations": configuration.iterations,
                })),
                FieldNode::SingleSelect {
                    id,
                    name,
                    data_type,
                    options,
                } => Some(serde_json::json!({
                    "id": id, "name": name, "data_type": data_type,
                    "options": options,
                })),
                FieldNode::Other => None,
            })
            .collect();
        Ok(serde_json::json!({ "fields": fields }))
    }

    pub async fn get_project_items(&self, input: GetProjectItemsInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                GET_PROJECT_ITEMS,
                serde_json::json!({
                    "id": input.id,
                    "first": input.first.min(100),
                    "after": input.after,
                }),
            )
            .await?;
        let conn = data
            .pointer("/node/items")
            .cloned()
            .filter(|v| !v.is_null());
        let Some(conn) = conn else {
            return Err(Error::NotFound(format!("Project {} not found", input.id)));
        };
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Conn {
            page_info: PageInfoNode,
            nodes: Vec<ItemNode>,
        }
        let conn: Conn = serde_json::from_value(conn)
            .map_err(|e| Error::Upstream(format!("unexpected item list shape: {}", e)))?;
        let items: Vec<ProjectItem> = conn.nodes.into_iter().map(reshape_item).collect();
        Ok(serde_json::json!({
            "items": items,
            "page_info": PageInfo {
                has_next_page: conn.page_info.has_next_page,
                end_cursor: conn.page_info.end_cursor,
            },
        }))
    }

    /// Composite: add the content to the project, then apply each supplied
    /// field value sequentially. A mid-sequence failure leaves the created
    /// item and earlier values in place, skips the rest, and propagates the
    /// failing update's error.
    pub async fn create_project_item(&self, input: CreateProjectItemInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                ADD_ITEM_BY_ID,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "contentId": input.content_id,
                    }
                }),
            )
            .await?;
        let item_id = string_at(&data, &["addProjectV2ItemById", "item", "id"])?;

        let mut applied = 0usize;
        for fv in &input.field_values {
            self.update_item_field_value(
                &input.project_id,
                &item_id,
                &fv.field_id,
                &fv.value,
                mutation_id(None),
            )
            .await?;
            applied += 1;
        }
        Ok(serde_json::json!({ "item_id": item_id, "applied_field_values": applied }))
    }

    pub async fn update_project_item_field(
        &self,
        input: UpdateItemFieldInput,
    ) -> Result<Value, Error> {
        let item_id = self
            .update_item_field_value(
                &input.project_id,
                &input.item_id,
                &input.field_id,
                &input.value,
                mutation_id(input.client_mutation_id),
            )
            .await?;
        Ok(serde_json::json!({ "success": true, "item_id": item_id }))
    }

    /// Bulk helper: apply one field/value payload to every item id, strictly
    /// in input order, sequentially. Per-item failures are captured in the
    /// result entry and never stop the remaining items; there is no rollback.
    pub async fn bulk_update_project_item_field(
        &self,
        input: BulkUpdateItemFieldInput,
    ) -> Result<Value, Error> {
        let batch = input
            .client_mutation_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut results: Vec<BulkItemResult> = Vec::with_capacity(input.item_ids.len());
        for item_id in &input.item_ids {
            let outcome = self
                .update_item_field_value(
                    &input.project_id,
                    item_id,
                    &input.field_id,
                    &input.value,
                    format!("bulk-update-{}-{}", batch, item_id),
                )
                .await;
            results.push(match outcome {
                Ok(_) => BulkItemResult {
                    item_id: item_id.clone(),
                    success: true,
                    error: None,
                },
                Err(e) => BulkItemResult {
                    item_id: item_id.clone(),
                    success: false,
                    error: Some(e.to_string()),
                },
            });
        }
        Ok(serde_json::json!({ "results": results }))
    }

    async fn update_item_field_value(
        &self,
        project_id: &str,
        item_id: &str,
        field_id: &str,
        value: &FieldValue,
        client_mutation_id: String,
    ) -> Result<String, Error> {
        let data = self
            .client
            .graphql(
                UPDATE_ITEM_FIELD_VALUE,
                serde_json::json!({
                    "input": {
                        "projectId": project_id,
                        "itemId": item_id,
                        "fieldId": field_id,
                        "value": value,
                        "clientMutationId": client_mutation_id,
                    }
                }),
            )
            .await?;
        string_at(&data, &["updateProjectV2ItemFieldValue", "projectV2Item", "id"])
    }

    pub async fn create_project(&self, input: CreateProjectInput) -> Result<Value, Error> {
        let mut obj = serde_json::Map::new();
        obj.insert("ownerId".into(), Value::String(input.owner_id));
        obj.insert("title".into(), Value::String(input.title));
        obj.insert(
            "clientMutationId".into(),
            Value::String(mutation_id(input.client_mutation_id)),
        );
        if let Some(repo) = input.repository_id {
            obj.insert("repositoryId".into(), Value::String(repo));
        }
        if let Some(team) = input.team_id {
            obj.insert("teamId".into(), Value::String(team));
        }
        let gql = Value::Object(obj);
        let data = self
            .client
            .graphql(CREATE_PROJECT, serde_json::json!({ "input": gql }))
            .await?;
        let project = data
            .pointer("/createProjectV2/projectV2")
            .cloned()
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::Upstream("project creation returned no project".into()))?;
        Ok(serde_json::json!({ "project": project }))
    }

    pub async fn update_project(&self, input: UpdateProjectInput) -> Result<Value, Error> {
        let mut obj = serde_json::Map::new();
        obj.insert("projectId".into(), Value::String(input.project_id));
        obj.insert(
            "clientMutationId".into(),
            Value::String(mutation_id(input.client_mutation_id)),
        );
        if let Some(title) = input.title {
            obj.insert("title".into(), Value::String(title));
        }
        if let Some(desc) = input.short_description {
            obj.insert("shortDescription".into(), Value::String(desc));
        }
        if let Some(public) = input.public {
            obj.insert("public".into(), Value::Bool(public));
        }
        if let Some(closed) = input.closed {
            obj.insert("closed".into(), Value::Bool(closed));
        }
        if let Some(readme) = input.readme {
            obj.insert("readme".into(), Value::String(readme));
        }
        let gql = Value::Object(obj);
        let data = self
            .client
            .graphql(UPDATE_PROJECT, serde_json::json!({ "input": gql }))
            .await?;
        let project = data
            .pointer("/updateProjectV2/projectV2")
            .cloned()
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::Upstream("project update returned no project".into()))?;
        Ok(serde_json::json!({ "project": project }))
    }

    pub async fn delete_project(&self, input: DeleteProjectInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                DELETE_PROJECT,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["deleteProjectV2", "projectV2", "id"])?;
        Ok(serde_json::json!({ "deleted_project_id": id }))
    }

    pub async fn copy_project(&self, input: CopyProjectInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                COPY_PROJECT,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "ownerId": input.owner_id,
                        "title": input.title,
                        "includeDraftIssues": input.include_draft_issues,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let project = data
            .pointer("/copyProjectV2/projectV2")
            .cloned()
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::Upstream("project copy returned no project".into()))?;
        Ok(serde_json::json!({ "project": project }))
    }

    pub async fn add_draft_issue(&self, input: AddDraftIssueInput) -> Result<Value, Error> {
        let mut obj = serde_json::Map::new();
        obj.insert("projectId".into(), Value::String(input.project_id));
        obj.insert("title".into(), Value::String(input.title));
        obj.insert(
            "clientMutationId".into(),
            Value::String(mutation_id(input.client_mutation_id)),
        );
        if let Some(body) = input.body {
            obj.insert("body".into(), Value::String(body));
        }
        if !input.assignee_ids.is_empty() {
            obj.insert("assigneeIds".into(), serde_json::json!(input.assignee_ids));
        }
        let gql = Value::Object(obj);
        let data = self
            .client
            .graphql(ADD_DRAFT_ISSUE, serde_json::json!({ "input": gql }))
            .await?;
        let id = string_at(&data, &["addProjectV2DraftIssue", "projectItem", "id"])?;
        Ok(serde_json::json!({ "item_id": id }))
    }

    pub async fn convert_draft_issue(&self, input: ConvertDraftIssueInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                CONVERT_DRAFT_ISSUE,
                serde_json::json!({
                    "input": {
                        "itemId": input.item_id,
                        "repositoryId": input.repository_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["convertProjectV2DraftIssueItemToIssue", "item", "id"])?;
        Ok(serde_json::json!({ "item_id": id }))
    }

    pub async fn add_item_to_project(&self, input: AddItemToProjectInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                ADD_ITEM_BY_ID,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "contentId": input.content_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["addProjectV2ItemById", "item", "id"])?;
        Ok(serde_json::json!({ "item_id": id }))
    }

    pub async fn update_item_position(&self, input: UpdateItemPositionInput) -> Result<Value, Error> {
        let mut obj = serde_json::Map::new();
        obj.insert("projectId".into(), Value::String(input.project_id));
        obj.insert("itemId".into(), Value::String(input.item_id));
        obj.insert(
            "clientMutationId".into(),
            Value::String(mutation_id(input.client_mutation_id)),
        );
        if let Some(after) = input.after_id {
            obj.insert("afterId".into(), Value::String(after));
        }
        let gql = Value::Object(obj);
        self.client
            .graphql(UPDATE_ITEM_POSITION, serde_json::json!({ "input": gql }))
            .await?;
        Ok(serde_json::json!({ "success": true }))
    }

    pub async fn delete_project_item(&self, input: DeleteProjectItemInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                DELETE_PROJECT_ITEM,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "itemId": input.item_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["deleteProjectV2Item", "deletedItemId"])?;
        Ok(serde_json::json!({ "deleted_item_id": id }))
    }

    pub async fn create_project_field(&self, input: CreateProjectFieldInput) -> Result<Value, Error> {
        if input.data_type == FieldDataType::SingleSelect && input.single_select_options.is_empty() {
            return Err(Error::Validation(
                "`singleSelectOptions` must contain at least one option when `dataType` is SINGLE_SELECT"
                    .into(),
            ));
        }
        let mut obj = serde_json::Map::new();
        obj.insert("projectId".into(), Value::String(input.project_id));
        obj.insert("dataType".into(), serde_json::json!(input.data_type));
        obj.insert("name".into(), Value::String(input.name));
        obj.insert(
            "singleSelectOptions".into(),
            serde_json::json!(input.single_select_options),
        );
        obj.insert(
            "clientMutationId".into(),
            Value::String(mutation_id(input.client_mutation_id)),
        );
        if let Some(cfg) = input.iteration_configuration {
            obj.insert("iterationConfiguration".into(), serde_json::json!(cfg));
        }
        let gql = Value::Object(obj);
        let data = self
            .client
            .graphql(CREATE_PROJECT_FIELD, serde_json::json!({ "input": gql }))
            .await?;
        let field = data
            .pointer("/createProjectV2Field/projectV2Field")
            .cloned()
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::Upstream("field creation returned no field".into()))?;
        Ok(serde_json::json!({ "field": field }))
    }

    pub async fn update_project_field(&self, input: UpdateProjectFieldInput) -> Result<Value, Error> {
        let mut obj = serde_json::Map::new();
        obj.insert("fieldId".into(), Value::String(input.field_id));
        obj.insert(
            "clientMutationId".into(),
            Value::String(mutation_id(input.client_mutation_id)),
        );
        if let Some(name) = input.name {
            obj.insert("name".into(), Value::String(name));
        }
        if !input.single_select_options.is_empty() {
            obj.insert(
                "singleSelectOptions".into(),
                serde_json::json!(input.single_select_options),
            );
        }
        if let Some(cfg) = input.iteration_configuration {
            obj.insert("iterationConfiguration".into(), serde_json::json!(cfg));
        }
        let gql = Value::Object(obj);
        let data = self
            .client
            .graphql(UPDATE_PROJECT_FIELD, serde_json::json!({ "input": gql }))
            .await?;
        let field = data
            .pointer("/updateProjectV2Field/projectV2Field")
            .cloned()
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::Upstream("field update returned no field".into()))?;
        Ok(serde_json::json!({ "field": field }))
    }

    pub async fn delete_project_field(&self, input: DeleteProjectFieldInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                DELETE_PROJECT_FIELD,
                serde_json::json!({
                    "input": {
                        "fieldId": input.field_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["deleteProjectV2Field", "projectV2Field", "id"])?;
        Ok(serde_json::json!({ "deleted_field_id": id }))
    }

    pub async fn update_project_status(&self, input: UpdateProjectStatusInput) -> Result<Value, Error> {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "statusUpdateId".into(),
            Value::String(input.status_update_id),
        );
        obj.insert(
            "clientMutationId".into(),
            Value::String(mutation_id(input.client_mutation_id)),
        );
        if let Some(body) = input.body {
            obj.insert("body".into(), Value::String(body));
        }
        if let Some(start) = input.start_date {
            obj.insert("startDate".into(), Value::String(start));
        }
        if let Some(target) = input.target_date {
            obj.insert("targetDate".into(), Value::String(target));
        }
        if let Some(status) = input.status {
            obj.insert("status".into(), serde_json::json!(status));
        }
        let gql = Value::Object(obj);
        let data = self
            .client
            .graphql(UPDATE_PROJECT_STATUS, serde_json::json!({ "input": gql }))
            .await?;
        let status_update = data
            .pointer("/updateProjectV2StatusUpdate/statusUpdate")
            .cloned()
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::Upstream("status update returned no payload".into()))?;
        Ok(serde_json::json!({ "status_update": status_update }))
    }

    pub async fn archive_project_item(&self, input: ItemInProjectInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                ARCHIVE_ITEM,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "itemId": input.item_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["archiveProjectV2Item", "item", "id"])?;
        Ok(serde_json::json!({ "item_id": id, "archived": true }))
    }

    pub async fn unarchive_project_item(&self, input: ItemInProjectInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                UNARCHIVE_ITEM,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "itemId": input.item_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["unarchiveProjectV2Item", "item", "id"])?;
        Ok(serde_json::json!({ "item_id": id, "archived": false }))
    }

    pub async fn clear_item_field_value(&self, input: ClearItemFieldInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                CLEAR_ITEM_FIELD_VALUE,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "itemId": input.item_id,
                        "fieldId": input.field_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["clearProjectV2ItemFieldValue", "projectV2Item", "id"])?;
        Ok(serde_json::json!({ "success": true, "item_id": id }))
    }

    pub async fn mark_project_as_template(&self, input: ProjectTemplateInput) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                MARK_AS_TEMPLATE,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["markProjectV2AsTemplate", "projectV2", "id"])?;
        Ok(serde_json::json!({ "project_id": id, "template": true }))
    }

    pub async fn unmark_project_as_template(
        &self,
        input: ProjectTemplateInput,
    ) -> Result<Value, Error> {
        let data = self
            .client
            .graphql(
                UNMARK_AS_TEMPLATE,
                serde_json::json!({
                    "input": {
                        "projectId": input.project_id,
                        "clientMutationId": mutation_id(input.client_mutation_id),
                    }
                }),
            )
            .await?;
        let id = string_at(&data, &["unmarkProjectV2AsTemplate", "projectV2", "id"])?;
        Ok(serde_json::json!({ "project_id": id, "template": false }))
    }
}

fn reshape_project(node: ProjectNode) -> ProjectDetail {
    ProjectDetail {
        id: node.id,
        title: node.title,
        short_description: node.short_description,
        url: node.url,
        number: node.number,
        creator: node.creator.map(|c| c.login),
        public: node.public,
        closed: node.closed,
        template: node.template,
        created_at: node.created_at,
        updated_at: node.updated_at,
    }
}

fn reshape_item(node: ItemNode) -> ProjectItem {
    let field_values = node
        .field_values
        .nodes
        .into_iter()
        .filter_map(|fv| match fv {
            ItemFieldValueNode::Text { text, field } => Some(ItemFieldValue {
                field_id: field.id,
                field_name: field.name,
                kind: "text",
                value: serde_json::json!(text),
            }),
            ItemFieldValueNode::Date { date, field } => Some(ItemFieldValue {
                field_id: field.id,
                field_name: field.name,
                kind: "date",
                value: serde_json::json!(date),
            }),
            ItemFieldValueNode::SingleSelect { name, field } => Some(ItemFieldValue {
                field_id: field.id,
                field_name: field.name,
                kind: "single_select",
                value: serde_json::json!(name),
            }),
            ItemFieldValueNode::Number { number, field } => Some(ItemFieldValue {
                field_id: field.id,
                field_name: field.name,
                kind: "number",
                value: serde_json::json!(number),
            }),
            ItemFieldValueNode::Iteration {
                title,
                start_date,
                duration,
                field,
            } => Some(ItemFieldValue {
                field_id: field.id,
                field_name: field.name,
                kind: "iteration",
                value: serde_json::json!({
                    "title": title,
                    "start_date": start_date,
                    "duration": duration,
                }),
            }),
            ItemFieldValueNode::Other => None,
        })
        .collect();

    let content = node.content.and_then(|c| match c {
        ContentNode::Issue(d) => Some(reshape_content("issue", d)),
        ContentNode::PullRequest(d) => Some(reshape_content("pull_request", d)),
        ContentNode::DraftIssue { id, title } => Some(ItemContent {
            kind: "draft_issue",
            id,
            title,
            number: None,
            state: None,
            url: None,
            repository: None,
        }),
        ContentNode::Other => None,
    });

    ProjectItem {
        id: node.id,
        item_type: node.item_type,
        archived: node.is_archived,
        content,
        field_values,
    }
}

fn reshape_content(kind: &'static str, d: ContentDetails) -> ItemContent {
    ItemContent {
        kind,
        id: d.id,
        title: d.title,
        number: Some(d.number),
        state: Some(d.state),
        url: Some(d.url),
        repository: Some(format!("{}/{}", d.repository.owner.login, d.repository.name)),
    }
}

fn string_at(data: &Value, path: &[&str]) -> Result<String, Error> {
    let mut cur = data;
    for p in path {
        cur = cur
            .get(p)
            .ok_or_else(|| Error::Upstream(format!("missing `{}` in GraphQL response", p)))?;
    }
    cur.as_str()
        .map(String::from)
        .ok_or_else(|| Error::Upstream(format!("expected string at `{}`", path.join("."))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(v: Value) -> Result<FieldValue, String> {
        serde_json::from_value::<FieldValue>(v).map_err(|e| e.to_string())
    }

    #[test]
    fn field_value_accepts_exactly_one_alternative() {
        assert_eq!(
            parse(serde_json::json!({ "text": "hello" })).unwrap(),
            FieldValue::Text("hello".into())
        );
        assert_eq!(
            parse(serde_json::json!({ "number": 5.0 })).unwrap(),
            FieldValue::Number(5.0)
        );
        assert_eq!(
            parse(serde_json::json!({ "iterationId": "IT_1" })).unwrap(),
            FieldValue::IterationId("IT_1".into())
        );
    }

    #[test]
    fn field_value_rejects_zero_alternatives() {
        let err = parse(serde_json::json!({})).unwrap_err();
        assert!(err.contains("exactly one"), "{}", err);
    }

    #[test]
    fn field_value_rejects_two_alternatives() {
        let err = parse(serde_json::json!({ "text": "a", "number": 1.0 })).unwrap_err();
        assert!(err.contains("exactly one"), "{}", err);
    }

    #[test]
    fn field_value_treats_empty_strings_as_unset() {
        // Empty text alongside a real date is still exactly one value.
        assert_eq!(
            parse(serde_json::json!({ "text": "", "date": "2025-06-01" })).unwrap(),
            FieldValue::Date("2025-06-01".into())
        );
        assert!(parse(serde_json::json!({ "text": "" })).is_err());
    }

    #[test]
    fn field_value_rejects_unknown_keys() {
        assert!(parse(serde_json::json!({ "text": "a", "bogus": 1 })).is_err());
    }

    #[test]
    fn field_value_serializes_to_single_key_object() {
        let v = serde_json::to_value(FieldValue::SingleSelectOptionId("OPT_1".into())).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["singleSelectOptionId"], "OPT_1");

        let v = serde_json::to_value(FieldValue::Number(8.0)).unwrap();
        assert_eq!(v, serde_json::json!({ "number": 8.0 }));
    }

    #[test]
    fn field_data_type_uses_upstream_spelling() {
        assert_eq!(
            serde_json::to_value(FieldDataType::SingleSelect).unwrap(),
            serde_json::json!("SINGLE_SELECT")
        );
        assert_eq!(
            serde_json::from_value::<FieldDataType>(serde_json::json!("ITERATION")).unwrap(),
            FieldDataType::Iteration
        );
    }

    #[test]
    fn item_field_value_nodes_tolerate_unselected_types() {
        // Field values of types the query does not select come back as
        // objects with only __typename.
        let nodes: Vec<ItemFieldValueNode> = serde_json::from_value(serde_json::json!([
            { "__typename": "ProjectV2ItemFieldTextValue", "text": "x",
              "field": { "id": "F1", "name": "Title" } },
            { "__typename": "ProjectV2ItemFieldLabelValue" }
        ]))
        .unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[1], ItemFieldValueNode::Other));
    }
}
