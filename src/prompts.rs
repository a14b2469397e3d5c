use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

fn prompt(name: &str, description: &str, arguments: Vec<PromptArgument>) -> PromptDescriptor {
    PromptDescriptor {
        name: name.into(),
        description: description.into(),
        arguments,
    }
}

fn arg(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.into(),
        description: description.into(),
        required,
    }
}

pub fn prompt_descriptors() -> Vec<PromptDescriptor> {
    vec![
        prompt(
            "create-sprint-project",
            "Create a new Sprint (iteration) project for Agile development",
            vec![
                arg("sprintName", "Name of the sprint (e.g., 'Sprint 23', 'Q2 Sprint 1')", true),
                arg("startDate", "Start date of the sprint (ISO format)", true),
                arg("duration", "Duration of sprint in days (typically 7, 14, or 30)", true),
                arg("goals", "Primary goals for this sprint", false),
            ],
        ),
        prompt(
            "manage-sprint-backlog",
            "Organize and prioritize issues in the sprint backlog",
            vec![
                arg("projectId", "GitHub Project ID to manage", true),
                arg("filterStatus", "Filter issues by status (e.g., 'Todo', 'In Progress')", false),
                arg(
                    "prioritizationStrategy",
                    "Strategy for prioritization (e.g., 'value-based', 'effort-based')",
                    false,
                ),
            ],
        ),
        prompt(
            "track-sprint-progress",
            "Generate a status report of the current sprint progress",
            vec![
                arg("projectId", "GitHub Project ID to track", true),
                arg("includeBurndown", "Whether to include burndown metrics", false),
                arg("highlightBlockers", "Whether to highlight blocked issues", false),
            ],
        ),
        prompt(
            "prepare-sprint-retrospective",
            "Prepare a retrospective report and plan for the next sprint",
            vec![
                arg("completedProjectId", "GitHub Project ID of the completed sprint", true),
                arg("includeMetrics", "Include completion metrics and statistics", false),
                arg("createNextSprint", "Automatically create next sprint project", false),
            ],
        ),
        prompt(
            "create-project-template",
            "Create a reusable project template for future sprints",
            vec![
                arg("templateName", "Name for the template", true),
                arg(
                    "customFields",
                    "Custom fields to include (e.g., 'Story Points', 'Priority')",
                    false,
                ),
                arg(
                    "statusColumns",
                    "Status columns to create (e.g., 'Todo,In Progress,Review,Done')",
                    false,
                ),
            ],
        ),
        prompt(
            "review-code",
            "Review a piece of code",
            vec![arg("code", "Code to review", true)],
        ),
    ]
}

fn argument<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    // Empty strings count as unset, same as the tool argument conventions.
    args.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn required<'a>(args: &'a Value, key: &str) -> Result<&'a str, Error> {
    argument(args, key)
        .ok_or_else(|| Error::Validation(format!("missing required argument `{}`", key)))
}

/// Render a prompt into its single user message. Optional arguments add their
/// line only when supplied; flag-like arguments add fixed text.
pub fn render_prompt(name: &str, args: &Value) -> Result<Value, Error> {
    let text = match name {
        "create-sprint-project" => {
            let mut text = format!(
                "Create a new Sprint (iteration) project for Agile development with the following details:\n\
                 - Sprint Name: {}\n- Start Date: {}\n- Duration: {} days",
                required(args, "sprintName")?,
                required(args, "startDate")?,
                required(args, "duration")?,
            );
            if let Some(goals) = argument(args, "goals") {
                text.push_str(&format!("\n- Goals: {}", goals));
            }
            text
        }
        "manage-sprint-backlog" => {
            let mut text = format!(
                "Organize and prioritize issues in the sprint backlog:\n- Project ID: {}",
                required(args, "projectId")?,
            );
            if let Some(status) = argument(args, "filterStatus") {
                text.push_str(&format!("\n- Filter Status: {}", status));
            }
            if let Some(strategy) = argument(args, "prioritizationStrategy") {
                text.push_str(&format!("\n- Prioritization Strategy: {}", strategy));
            }
            text
        }
        "track-sprint-progress" => {
            let mut text = format!(
                "Generate a status report of the current sprint progress:\n- Project ID: {}",
                required(args, "projectId")?,
            );
            if argument(args, "includeBurndown").is_some() {
                text.push_str("\n- Include burndown metrics");
            }
            if argument(args, "highlightBlockers").is_some() {
                text.push_str("\n- Highlight blocked issues");
            }
            text
        }
        "prepare-sprint-retrospective" => {
            let mut text = format!(
                "Prepare a retrospective report and plan for the next sprint:\n- Completed Project ID: {}",
                required(args, "completedProjectId")?,
            );
            if argument(args, "includeMetrics").is_some() {
                text.push_str("\n- Include completion metrics and statistics");
            }
            if argument(args, "createNextSprint").is_some() {
                text.push_str("\n- Automatically create next sprint project");
            }
            text
        }
        "create-project-template" => {
            let mut text = format!(
                "Create a reusable project template for future sprints:\n- Template Name: {}",
                required(args, "templateName")?,
            );
            if let Some(fields) = argument(args, "customFields") {
                text.push_str(&format!("\n- Custom Fields: {}", fields));
            }
            if let Some(columns) = argument(args, "statusColumns") {
                text.push_str(&format!("\n- Status Columns: {}", columns));
            }
            text
        }
        "review-code" => format!("Please review this code:\n\n{}", required(args, "code")?),
        other => {
            return Err(Error::Validation(format!("unknown prompt `{}`", other)));
        }
    };
    Ok(json!({
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": text }
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_text(rendered: &Value) -> &str {
        rendered["messages"][0]["content"]["text"].as_str().unwrap()
    }

    #[test]
    fn descriptor_names_match_renderable_prompts() {
        for d in prompt_descriptors() {
            let mut args = serde_json::Map::new();
            for a in &d.arguments {
                if a.required {
                    args.insert(a.name.clone(), Value::String("x".into()));
                }
            }
            render_prompt(&d.name, &Value::Object(args)).unwrap();
        }
    }

    #[test]
    fn optional_arguments_add_their_line_only_when_supplied() {
        let bare = render_prompt(
            "create-sprint-project",
            &serde_json::json!({
                "sprintName": "Sprint 23", "startDate": "2025-06-01", "duration": "14"
            }),
        )
        .unwrap();
        assert!(!message_text(&bare).contains("Goals"));

        let with_goals = render_prompt(
            "create-sprint-project",
            &serde_json::json!({
                "sprintName": "Sprint 23", "startDate": "2025-06-01", "duration": "14",
                "goals": "Ship the beta"
            }),
        )
        .unwrap();
        assert!(message_text(&with_goals).contains("- Goals: Ship the beta"));
    }

    #[test]
    fn empty_string_argument_counts_as_unset() {
        let rendered = render_prompt(
            "track-sprint-progress",
            &serde_json::json!({ "projectId": "PVT_1", "includeBurndown": "" }),
        )
        .unwrap();
        assert!(!message_text(&rendered).contains("burndown"));
    }

    #[test]
    fn missing_required_argument_is_a_validation_error() {
        let err = render_prompt("review-code", &serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("`code`"), "{}", err);
    }

    #[test]
    fn unknown_prompt_is_rejected() {
        let err = render_prompt("no-such-prompt", &serde_json::json!({})).unwrap_err();
        assert!(err.to_string().contains("no-such-prompt"), "{}", err);
    }
}
