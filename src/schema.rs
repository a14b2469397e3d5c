use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDescriptor {
    ToolDescriptor {
        name: name.into(),
        description: description.into(),
        input_schema,
    }
}

// Advertised as an open union; the deserializer enforces exactly-one-of with
// empty strings treated as unset.
fn field_value_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "description": "Field value; provide exactly one of text, number, date, singleSelectOptionId, iterationId",
        "properties": {
            "text": {"type": "string"},
            "number": {"type": "number"},
            "date": {"type": "string", "description": "ISO 8601 date"},
            "singleSelectOptionId": {"type": "string"},
            "iterationId": {"type": "string"}
        }
    })
}

fn single_select_options_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "name": {"type": "string"},
                "description": {"type": "string"},
                "color": {"type": "string", "enum": ["GRAY", "BLUE", "GREEN", "YELLOW", "ORANGE", "RED", "PINK", "PURPLE"]}
            },
            "required": ["name", "description", "color"]
        }
    })
}

fn iteration_configuration_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "startDate": {"type": "string"},
            "duration": {"type": "integer"},
            "iterations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "title": {"type": "string"},
                        "startDate": {"type": "string"},
                        "duration": {"type": "integer"}
                    },
                    "required": ["title", "startDate", "duration"]
                }
            }
        }
    })
}

pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        tool(
            "ping",
            "Health check; echoes a message.",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "message": {"type": "string"}
                }
            }),
        ),
        tool(
            "get-repository",
            "Get detailed information about a repository",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "name": {"type": "string", "description": "Repository name"},
                    "owner": {"type": "string", "description": "Repository owner login; falls back to GITHUB_OWNER"}
                },
                "required": ["name"]
            }),
        ),
        tool(
            "list-repositories",
            "List repositories owned by a user",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "owner": {"type": "string"},
                    "type": {"type": "string", "enum": ["all", "owner", "member"], "default": "all"},
                    "sort": {"type": "string", "enum": ["created", "updated", "pushed", "full_name"], "default": "full_name"},
                    "direction": {"type": "string", "enum": ["asc", "desc"], "default": "asc"},
                    "per_page": {"type": "integer", "default": 30},
                    "page": {"type": "integer", "default": 1}
                }
            }),
        ),
        tool(
            "get-issue",
            "Get detailed information about an issue",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "repo": {"type": "string"},
                    "number": {"type": "integer", "description": "Issue number"},
                    "owner": {"type": "string"}
                },
                "required": ["repo", "number"]
            }),
        ),
        tool(
            "list-issues",
            "List issues in a repository",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "repo": {"type": "string"},
                    "owner": {"type": "string"},
                    "state": {"type": "string", "enum": ["open", "closed", "all"], "default": "open"},
                    "labels": {"type": "array", "items": {"type": "string"}},
                    "assignee": {"type": "string"},
                    "milestone": {"type": "string"},
                    "sort": {"type": "string", "enum": ["created", "updated", "comments"], "default": "created"},
                    "direction": {"type": "string", "enum": ["asc", "desc"], "default": "desc"},
                    "per_page": {"type": "integer", "default": 30},
                    "page": {"type": "integer", "default": 1}
                },
                "required": ["repo"]
            }),
        ),
        tool(
            "create-issue",
            "Create a new issue in a repository",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "repo": {"type": "string"},
                    "title": {"type": "string"},
                    "owner": {"type": "string"},
                    "body": {"type": "string"},
                    "assignees": {"type": "array", "items": {"type": "string"}},
                    "milestone": {"type": "integer"},
                    "labels": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["repo", "title"]
            }),
        ),
        tool(
            "update-issue",
            "Update an existing issue",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "repo": {"type": "string"},
                    "issueNumber": {"type": "integer"},
                    "owner": {"type": "string"},
                    "title": {"type": "string"},
                    "body": {"type": "string"},
                    "state": {"type": "string", "enum": ["open", "closed"]},
                    "assignees": {"type": "array", "items": {"type": "string"}},
                    "labels": {"type": "array", "items": {"type": "string"}},
                    "milestone": {"type": ["integer", "null"], "description": "Milestone number; null clears the milestone"}
                },
                "required": ["repo", "issueNumber"]
            }),
        ),
        tool(
            "get-project",
            "Get detailed information about a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "id": {"type": "string", "description": "Project node ID"}
                },
                "required": ["id"]
            }),
        ),
        tool(
            "list-projects",
            "List projects for a user",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "login": {"type": "string", "description": "User login; falls back to GITHUB_OWNER"},
                    "first": {"type": "integer", "default": 20},
                    "after": {"type": "string", "description": "Cursor for pagination"}
                }
            }),
        ),
        tool(
            "get-project-columns",
            "Get the status columns (single-select fields) of a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "id": {"type": "string"}
                },
                "required": ["id"]
            }),
        ),
        tool(
            "get-project-fields",
            "Get the fields of a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "id": {"type": "string"}
                },
                "required": ["id"]
            }),
        ),
        tool(
            "get-project-items",
            "Get items of a project with their field values",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "id": {"type": "string"},
                    "first": {"type": "integer", "default": 20},
                    "after": {"type": "string"}
                },
                "required": ["id"]
            }),
        ),
        tool(
            "create-project-item",
            "Add an issue or pull request to a project and optionally set field values",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "contentId": {"type": "string", "description": "Issue or pull request node ID"},
                    "fieldValues": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "additionalProperties": false,
                            "properties": {
                                "fieldId": {"type": "string"},
                                "value": field_value_schema()
                            },
                            "required": ["fieldId", "value"]
                        }
                    }
                },
                "required": ["projectId", "contentId"]
            }),
        ),
        tool(
            "update-project-item-field",
            "Update a field value of a project item",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "itemId": {"type": "string"},
                    "fieldId": {"type": "string"},
                    "value": field_value_schema(),
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "itemId", "fieldId", "value"]
            }),
        ),
        tool(
            "bulk-update-project-item-field",
            "Update the same field value on multiple project items",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "itemIds": {"type": "array", "items": {"type": "string"}},
                    "fieldId": {"type": "string"},
                    "value": field_value_schema(),
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "itemIds", "fieldId", "value"]
            }),
        ),
        tool(
            "create-project",
            "Create a new project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "ownerId": {"type": "string", "description": "User or organization node ID"},
                    "title": {"type": "string"},
                    "repositoryId": {"type": "string"},
                    "teamId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["ownerId", "title"]
            }),
        ),
        tool(
            "update-project",
            "Update a project's settings",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "title": {"type": "string"},
                    "shortDescription": {"type": "string"},
                    "public": {"type": "boolean"},
                    "closed": {"type": "boolean"},
                    "readme": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId"]
            }),
        ),
        tool(
            "delete-project",
            "Delete a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId"]
            }),
        ),
        tool(
            "copy-project",
            "Copy a project to a new owner",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "ownerId": {"type": "string"},
                    "title": {"type": "string"},
                    "includeDraftIssues": {"type": "boolean", "default": false},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "ownerId", "title"]
            }),
        ),
        tool(
            "add-draft-issue",
            "Add a draft issue to a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "title": {"type": "string"},
                    "body": {"type": "string"},
                    "assigneeIds": {"type": "array", "items": {"type": "string"}},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "title"]
            }),
        ),
        tool(
            "convert-draft-issue",
            "Convert a draft issue project item to a real issue",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "itemId": {"type": "string"},
                    "repositoryId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["itemId", "repositoryId"]
            }),
        ),
        tool(
            "add-item-to-project",
            "Add an existing issue or pull request to a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "contentId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "contentId"]
            }),
        ),
        tool(
            "update-item-position",
            "Move a project item; omit afterId to move it to the top",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "itemId": {"type": "string"},
                    "afterId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "itemId"]
            }),
        ),
        tool(
            "delete-project-item",
            "Remove an item from a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "itemId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "itemId"]
            }),
        ),
        tool(
            "create-project-field",
            "Create a new field in a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "dataType": {"type": "string", "enum": ["TEXT", "NUMBER", "DATE", "SINGLE_SELECT", "ITERATION"]},
                    "name": {"type": "string"},
                    "singleSelectOptions": single_select_options_schema(),
                    "iterationConfiguration": iteration_configuration_schema(),
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "dataType", "name"]
            }),
        ),
        tool(
            "update-project-field",
            "Update a project field's name or options",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "fieldId": {"type": "string"},
                    "name": {"type": "string"},
                    "singleSelectOptions": single_select_options_schema(),
                    "iterationConfiguration": iteration_configuration_schema(),
                    "clientMutationId": {"type": "string"}
                },
                "required": ["fieldId"]
            }),
        ),
        tool(
            "delete-project-field",
            "Delete a field from a project",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "fieldId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["fieldId"]
            }),
        ),
        tool(
            "update-project-status",
            "Update a project status update entry",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "statusUpdateId": {"type": "string"},
                    "body": {"type": "string"},
                    "startDate": {"type": "string"},
                    "targetDate": {"type": "string"},
                    "status": {"type": "string", "enum": ["INACTIVE", "ON_TRACK", "AT_RISK", "OFF_TRACK", "COMPLETE"]},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["statusUpdateId"]
            }),
        ),
        tool(
            "archive-project-item",
            "Archive a project item",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "itemId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "itemId"]
            }),
        ),
        tool(
            "unarchive-project-item",
            "Unarchive a project item",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "itemId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "itemId"]
            }),
        ),
        tool(
            "clear-item-field-value",
            "Clear a field value on a project item",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "itemId": {"type": "string"},
                    "fieldId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId", "itemId", "fieldId"]
            }),
        ),
        tool(
            "mark-project-as-template",
            "Mark a project as a template",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId"]
            }),
        ),
        tool(
            "unmark-project-as-template",
            "Unmark a project as a template",
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "projectId": {"type": "string"},
                    "clientMutationId": {"type": "string"}
                },
                "required": ["projectId"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique() {
        let tools = tool_descriptors();
        let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn every_schema_rejects_unknown_keys() {
        for t in tool_descriptors() {
            assert_eq!(
                t.input_schema["additionalProperties"],
                serde_json::json!(false),
                "{} must close its schema",
                t.name
            );
        }
    }

    #[test]
    fn field_value_union_lists_all_alternatives() {
        let schema = field_value_schema();
        let props = schema["properties"].as_object().unwrap();
        for key in ["text", "number", "date", "singleSelectOptionId", "iterationId"] {
            assert!(props.contains_key(key), "missing {}", key);
        }
        assert_eq!(props.len(), 5);
    }
}
