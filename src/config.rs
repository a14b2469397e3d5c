use std::env;

/// Runtime configuration for the GitHub API client.
/// Values are sourced from environment variables with sensible defaults;
/// everything here is read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub default_owner: Option<String>,
    pub api_url: String,
    pub graphql_url: String,
    pub api_version: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Operating-mode flag carried over from deployment tooling; unused by tool logic.
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - GITHUB_TOKEN (or GH_TOKEN) [required]
    /// - GITHUB_OWNER (default owner/login for tools that accept one)
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - GITHUB_GRAPHQL_URL (default: <GITHUB_API_URL>/graphql)
    /// - GITHUB_API_VERSION (default: 2022-11-28)
    /// - GITHUB_HTTP_TIMEOUT_SECS (default: 30)
    /// - GITHUB_USER_AGENT (default: github-projects-mcp/<version>)
    /// - PORT (optional, informational only)
    pub fn from_env() -> Result<Self, String> {
        let token = env::var("GITHUB_TOKEN")
            .or_else(|_| env::var("GH_TOKEN"))
            .map_err(|_| "Missing GITHUB_TOKEN or GH_TOKEN".to_string())?;

        let default_owner = env::var("GITHUB_OWNER").ok().filter(|s| !s.is_empty());
        let api_url =
            env::var("GITHUB_API_URL").unwrap_or_else(|_| "https://api.github.com".to_string());
        let graphql_url = env::var("GITHUB_GRAPHQL_URL").unwrap_or_else(|_| {
            let mut base = api_url.trim_end_matches('/').to_string();
            base.push_str("/graphql");
            base
        });
        let api_version =
            env::var("GITHUB_API_VERSION").unwrap_or_else(|_| "2022-11-28".to_string());
        let timeout_secs = env::var("GITHUB_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let user_agent = env::var("GITHUB_USER_AGENT")
            .unwrap_or_else(|_| format!("github-projects-mcp/{}", env!("CARGO_PKG_VERSION")));
        let port = env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok());

        Ok(Self {
            token,
            default_owner,
            api_url,
            graphql_url,
            api_version,
            user_agent,
            timeout_secs,
            port,
        })
    }
}
