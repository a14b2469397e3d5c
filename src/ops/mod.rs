pub mod issues;
pub mod projects;
pub mod repos;

use crate::error::Error;
use crate::http::GithubClient;
use uuid::Uuid;

/// All operation modules, constructed once at startup around the shared
/// API client.
pub struct Operations {
    pub repos: repos::RepositoryOps,
    pub issues: issues::IssueOps,
    pub projects: projects::ProjectOps,
}

impl Operations {
    pub fn new(client: GithubClient) -> Self {
        Self {
            repos: repos::RepositoryOps::new(client.clone()),
            issues: issues::IssueOps::new(client.clone()),
            projects: projects::ProjectOps::new(client),
        }
    }
}

/// Defaulted GraphQL clientMutationId for callers that did not supply one.
pub(crate) fn mutation_id(supplied: Option<String>) -> String {
    supplied.unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Resolve an owner/login argument against the configured default.
pub(crate) fn resolve_owner(
    explicit: Option<String>,
    default: Option<&str>,
    field: &str,
) -> Result<String, Error> {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| default.map(String::from))
        .ok_or_else(|| {
            Error::Validation(format!(
                "missing required field `{}` and no GITHUB_OWNER default is configured",
                field
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_falls_back_to_default() {
        assert_eq!(
            resolve_owner(None, Some("octo"), "owner").unwrap(),
            "octo"
        );
        assert_eq!(
            resolve_owner(Some("alice".into()), Some("octo"), "owner").unwrap(),
            "alice"
        );
        // Empty string is not a usable owner.
        assert_eq!(
            resolve_owner(Some(String::new()), Some("octo"), "owner").unwrap(),
            "octo"
        );
    }

    #[test]
    fn missing_owner_is_a_validation_error_naming_the_field() {
        let err = resolve_owner(None, None, "login").unwrap_err();
        assert!(err.to_string().contains("`login`"), "{}", err);
    }
}
