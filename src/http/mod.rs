use crate::config::Config;
use crate::error::Error;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Thin authenticated wrapper over the GitHub REST and GraphQL endpoints.
///
/// One instance is built at startup and shared by every operation module.
/// There is deliberately no retry, backoff, or rate tracking here: failures
/// are classified and propagated immediately, and the only timeout is the
/// transport-level one configured on the underlying client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    cfg: Config,
}

impl GithubClient {
    pub fn new(cfg: Config) -> Result<Self, reqwest::Error> {
        let mut default_headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&cfg.user_agent) {
            default_headers.insert(USER_AGENT, ua);
        }
        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .use_rustls_tls()
            .build()?;
        Ok(Self { client, cfg })
    }

    pub fn default_owner(&self) -> Option<&str> {
        self.cfg.default_owner.as_deref()
    }

    fn auth_header(&self) -> Result<HeaderValue, Error> {
        HeaderValue::from_str(&format!("Bearer {}", self.cfg.token))
            .map_err(|_| Error::Auth("token contains invalid header characters".into()))
    }

    /// Perform a REST call. `query` pairs are appended to the path verbatim,
    /// in order. A 204 response yields an empty object; any non-2xx status
    /// becomes a typed error carrying the upstream body.
    pub async fn rest(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = build_rest_url(&self.cfg.api_url, path, query)
            .map_err(|e| Error::Upstream(format!("invalid request URL: {}", e)))?;
        debug!("REST {} {}", method, url);

        let mut req = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, self.auth_header()?)
            .header("X-GitHub-Api-Version", &self.cfg.api_version)
            .header(
                ACCEPT,
                HeaderValue::from_static("application/vnd.github+json"),
            );
        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await?;
        let status = res.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Object(Default::default()));
        }
        if status.is_success() {
            return res.json::<Value>().await.map_err(Error::from);
        }

        let reset_at = rate_reset_from_headers(res.headers());
        let exhausted = rate_limit_exhausted(res.headers());
        let text = res.text().await.unwrap_or_default();
        warn!("REST call failed with status {}", status);
        // Primary rate limiting surfaces as 403 with a zeroed remaining quota.
        if status == StatusCode::FORBIDDEN && exhausted {
            return Err(Error::RateLimited {
                message: error_body_message(&text),
                reset_at,
            });
        }
        Err(Error::from_status(status, error_body_message(&text), reset_at))
    }

    /// Perform a GraphQL call and return the `data` value.
    ///
    /// A 200 response whose envelope carries a non-empty `errors` array is a
    /// hard failure, never a partial result; a 200 without `data` is also an
    /// error.
    pub async fn graphql(&self, query: &str, variables: Value) -> Result<Value, Error> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        debug!("GraphQL POST {}", self.cfg.graphql_url);
        let res = self
            .client
            .post(&self.cfg.graphql_url)
            .header(AUTHORIZATION, self.auth_header()?)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let reset_at = rate_reset_from_headers(res.headers());
            let exhausted = rate_limit_exhausted(res.headers());
            let text = res.text().await.unwrap_or_default();
            warn!("GraphQL call failed with status {}", status);
            // Same primary-rate-limit shape as REST: 403 with a zeroed quota.
            if status == StatusCode::FORBIDDEN && exhausted {
                return Err(Error::RateLimited {
                    message: error_body_message(&text),
                    reset_at,
                });
            }
            return Err(Error::from_status(status, error_body_message(&text), reset_at));
        }

        let envelope: Value = res.json().await?;
        if let Some(errors) = envelope.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let msg = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(|m| m.as_str())
                            .unwrap_or("unknown GraphQL error")
                            .to_string()
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(Error::Upstream(msg));
            }
        }
        match envelope.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(Error::Upstream("GraphQL response contained no data".into())),
        }
    }
}

/// Join the API base URL with a path and append query pairs in order.
pub fn build_rest_url(base: &str, path: &str, query: &[(&str, String)]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in query {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Percent-encode a single URL path segment (owner or repository name).
pub fn encode_path_segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .map(|n| n == 0)
        .unwrap_or(false)
}

/// Extract the rate-limit reset instant from response headers, if present.
pub fn rate_reset_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|epoch| chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0))
        .map(|dt| dt.to_rfc3339())
}

// GitHub error bodies (REST and GraphQL alike) are JSON objects with a
// `message` field; fall back to the raw body when they are not.
fn error_body_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_url_appends_query_pairs_in_order() {
        let url = build_rest_url(
            "https://api.github.com",
            "/repos/octo/demo/issues",
            &[
                ("state", "open".to_string()),
                ("per_page", "50".to_string()),
                ("page", "2".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/demo/issues?state=open&per_page=50&page=2"
        );
    }

    #[test]
    fn rest_url_without_query_has_no_question_mark() {
        let url = build_rest_url("https://api.github.com/", "/user/repos", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/user/repos");
    }

    #[test]
    fn path_segment_encoding() {
        assert_eq!(encode_path_segment("Prod Env/Blue%"), "Prod%20Env%2FBlue%25");
        assert_eq!(encode_path_segment("abc-._~123"), "abc-._~123");
    }

    #[test]
    fn rate_reset_header_parses_to_rfc3339() {
        let mut h = HeaderMap::new();
        h.insert("x-ratelimit-reset", "0".parse().unwrap());
        let at = rate_reset_from_headers(&h).unwrap();
        assert!(at.starts_with("1970-01-01T00:00:00"));
    }

    #[test]
    fn error_body_message_prefers_json_message_field() {
        assert_eq!(error_body_message("{\"message\":\"Not Found\"}"), "Not Found");
        assert_eq!(error_body_message("plain body"), "plain body");
    }
}
