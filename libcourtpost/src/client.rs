//! Authenticated clients for the status service
//!
//! [`ClientFactory`] turns resolved [`AccountCredentials`] into a handle that
//! implements [`StatusApi`]. Construction is purely local; credentials are
//! only proven valid when a post is submitted.
//!
//! # Examples
//!
//! ```no_run
//! use libcourtpost::accounts::{resolve, Account};
//! use libcourtpost::client::{ClientFactory, StatusApi, TwitterClientFactory};
//! use libcourtpost::config::ApiConfig;
//! use libcourtpost::credentials;
//!
//! # async fn example() -> libcourtpost::Result<()> {
//! let bundle = credentials::load("~/.config/courtpost/.env.twitter")?;
//! let creds = resolve(Account::Courtlab, &bundle)?;
//!
//! let client = TwitterClientFactory::new(&ApiConfig::default()).build(creds)?;
//! let created = client.create_post("Hello from the lab").await?;
//! println!("Posted: {}", created.id);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::accounts::AccountCredentials;
use crate::config::ApiConfig;
use crate::error::{ConfigError, Result, SubmissionError};
use crate::oauth::OAuthSigner;

const CREATE_POST_PATH: &str = "/2/tweets";

/// A post acknowledged by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPost {
    /// Identifier issued by the service
    pub id: String,
    /// Text as stored by the service, when echoed back
    pub text: Option<String>,
}

/// The remote "create post" operation
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Submit `text` as a single new post
    ///
    /// Exactly one request is made; failures are never retried.
    async fn create_post(&self, text: &str) -> std::result::Result<CreatedPost, SubmissionError>;
}

/// Builds an authenticated handle for one account
pub trait ClientFactory {
    type Client: StatusApi;

    /// # Errors
    ///
    /// Returns `CourtpostError::MissingCredential` if any secret is empty, or
    /// a configuration error if the handle cannot be set up locally.
    fn build(&self, credentials: AccountCredentials) -> Result<Self::Client>;
}

/// Factory for [`TwitterClient`]s sharing one set of HTTP settings
#[derive(Debug, Clone)]
pub struct TwitterClientFactory {
    base_url: String,
    timeout: Duration,
}

impl TwitterClientFactory {
    pub fn new(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(api.timeout_secs),
        }
    }
}

impl ClientFactory for TwitterClientFactory {
    type Client = TwitterClient;

    fn build(&self, credentials: AccountCredentials) -> Result<TwitterClient> {
        credentials.ensure_complete()?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("courtpost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(TwitterClient {
            http,
            endpoint: format!("{}{}", self.base_url, CREATE_POST_PATH),
            credentials,
        })
    }
}

/// Twitter API v2 client bound to one account
pub struct TwitterClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: AccountCredentials,
}

impl TwitterClient {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credentials(&self) -> &AccountCredentials {
        &self.credentials
    }
}

impl fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterClient")
            .field("endpoint", &self.endpoint)
            .field("account", &self.credentials.account())
            .finish()
    }
}

#[derive(Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreatePostResponse {
    data: Option<PostData>,
    errors: Option<Vec<ErrorItem>>,
}

#[derive(Deserialize)]
struct PostData {
    id: PostId,
    text: Option<String>,
}

/// Post ids are documented as strings, but numeric ids are accepted too
#[derive(Deserialize)]
#[serde(untagged)]
enum PostId {
    Text(String),
    Number(u64),
}

impl PostId {
    fn into_string(self) -> String {
        match self {
            PostId::Text(id) => id,
            PostId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    detail: Option<String>,
    title: Option<String>,
    errors: Option<Vec<ErrorItem>>,
}

#[derive(Deserialize)]
struct ErrorItem {
    message: Option<String>,
    detail: Option<String>,
}

impl ErrorItem {
    fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.detail.as_deref())
    }
}

#[async_trait]
impl StatusApi for TwitterClient {
    async fn create_post(&self, text: &str) -> std::result::Result<CreatedPost, SubmissionError> {
        debug!(
            account = %self.credentials.account(),
            endpoint = %self.endpoint,
            chars = text.chars().count(),
            "Submitting post"
        );

        let authorization =
            OAuthSigner::new(&self.credentials).authorization_header("POST", &self.endpoint, &[]);

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, authorization)
            .json(&CreatePostRequest { text })
            .send()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        debug!(status = status.as_u16(), "Create post response received");

        if !status.is_success() {
            return Err(map_error_response(status, &body));
        }

        parse_created(&body, text)
    }
}

fn parse_created(body: &str, sent: &str) -> std::result::Result<CreatedPost, SubmissionError> {
    let parsed: CreatePostResponse = serde_json::from_str(body)
        .map_err(|e| SubmissionError::Response(format!("Unexpected response from service: {}", e)))?;

    let data = match parsed.data {
        Some(data) => data,
        None => {
            let message = parsed
                .errors
                .as_deref()
                .and_then(first_error_text)
                .unwrap_or("Service response did not include a post");
            return Err(SubmissionError::Rejected(message.to_string()));
        }
    };

    let id = data.id.into_string();
    if id.trim().is_empty() {
        return Err(SubmissionError::Response(
            "Service response carried an empty post id".to_string(),
        ));
    }

    if let Some(stored) = data.text.as_deref() {
        // The service may rewrite links, so this is informational only
        if stored != sent {
            warn!(id = %id, "Stored post text differs from submitted text");
        }
    }

    Ok(CreatedPost {
        id,
        text: data.text,
    })
}

/// Turn a non-success response into a `SubmissionError`
///
/// The reason is the service's own wording: `detail`, then the first
/// `errors[].message`, then `title`, then the raw body.
fn map_error_response(status: StatusCode, body: &str) -> SubmissionError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let message = parsed
        .detail
        .clone()
        .or_else(|| {
            parsed
                .errors
                .as_deref()
                .and_then(first_error_text)
                .map(str::to_string)
        })
        .or_else(|| parsed.title.clone())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        StatusCode::UNAUTHORIZED => SubmissionError::Authentication(message),
        _ => SubmissionError::Rejected(message),
    }
}

fn first_error_text(errors: &[ErrorItem]) -> Option<&str> {
    errors.iter().find_map(ErrorItem::text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_created_extracts_id() {
        let created = parse_created(r#"{"data":{"id":"1445880548472328192","text":"hello"}}"#, "hello").unwrap();
        assert_eq!(created.id, "1445880548472328192");
        assert_eq!(created.text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_parse_created_accepts_numeric_id() {
        let created = parse_created(r#"{"data":{"id":123,"text":"hello"}}"#, "hello").unwrap();
        assert_eq!(created.id, "123");
    }

    #[test]
    fn test_parse_created_rejects_non_scalar_id() {
        let err = parse_created(r#"{"data":{"id":{"n":1}}}"#, "hello").unwrap_err();
        assert!(matches!(err, SubmissionError::Response(_)));
    }

    #[test]
    fn test_parse_created_tolerates_rewritten_text() {
        let created = parse_created(
            r#"{"data":{"id":"9","text":"see https://t.co/abc"}}"#,
            "see https://example.com",
        )
        .unwrap();
        assert_eq!(created.id, "9");
    }

    #[test]
    fn test_parse_created_rejects_garbage() {
        let err = parse_created("<html>oops</html>", "hello").unwrap_err();
        assert!(matches!(err, SubmissionError::Response(_)));
    }

    #[test]
    fn test_parse_created_rejects_empty_id() {
        let err = parse_created(r#"{"data":{"id":""}}"#, "hello").unwrap_err();
        assert!(matches!(err, SubmissionError::Response(_)));
    }

    #[test]
    fn test_parse_created_errors_without_data() {
        let err = parse_created(r#"{"errors":[{"message":"duplicate status"}]}"#, "hi").unwrap_err();
        assert_eq!(err, SubmissionError::Rejected("duplicate status".to_string()));
    }

    #[test]
    fn test_map_error_prefers_detail() {
        let body = r#"{"title":"Forbidden","detail":"You are not allowed to create a Tweet with duplicate content.","type":"about:blank","status":403}"#;
        let err = map_error_response(StatusCode::FORBIDDEN, body);
        assert_eq!(
            err,
            SubmissionError::Rejected(
                "You are not allowed to create a Tweet with duplicate content.".to_string()
            )
        );
    }

    #[test]
    fn test_map_error_v1_style_errors() {
        let body = r#"{"errors":[{"code":187,"message":"Status is a duplicate."}]}"#;
        let err = map_error_response(StatusCode::FORBIDDEN, body);
        assert_eq!(err.to_string(), "Status is a duplicate.");
    }

    #[test]
    fn test_map_error_unauthorized_is_authentication() {
        let body = r#"{"title":"Unauthorized","type":"about:blank","status":401,"detail":"Unauthorized"}"#;
        let err = map_error_response(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err, SubmissionError::Authentication("Unauthorized".to_string()));
    }

    #[test]
    fn test_map_error_falls_back_to_body_then_status() {
        let err = map_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "upstream down");

        let err = map_error_response(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_factory_strips_trailing_slash() {
        let api = ApiConfig {
            base_url: "https://api.example.test/".to_string(),
            ..ApiConfig::default()
        };
        let factory = TwitterClientFactory::new(&api);
        assert_eq!(factory.base_url, "https://api.example.test");
    }
}
