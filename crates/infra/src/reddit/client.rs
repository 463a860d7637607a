use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::from_str;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::tree::{Listing, Pending, Thing, TreeWalk};
use super::url::submission_id_from_url;
use giveaway_core::domain::collector::{DiscussionSource, SourceError};
use giveaway_core::domain::submission::Submission;
use giveaway_core::types::post_url::PostUrl;

const TOKEN_ENDPOINT: &str = "https://www.reddit.com/api/v1/access_token";
const API_ENDPOINT: &str = "https://oauth.reddit.com";
const WEB_BASE_URL: &str = "https://www.reddit.com";
const MORE_CHILDREN_BATCH: usize = 100;
const COMMENT_LIMIT: &str = "500";
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum RedditError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oauth error: {0}")]
    OAuth(String),
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),
    #[error("not a submission url: {0}")]
    InvalidUrl(String),
    #[error("redirected: {0}")]
    Redirect(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<RedditError> for SourceError {
    fn from(err: RedditError) -> Self {
        match err {
            RedditError::InvalidUrl(url) | RedditError::Redirect(url) => {
                SourceError::NotASubmission(url)
            }
            RedditError::NotFound(url) => SourceError::SubmissionNotFound(url),
            other => SourceError::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditCredentials {
    /// Trims every field; all three must be present.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        user_agent: &str,
    ) -> Result<Self, RedditError> {
        let client_id = required(client_id, "client id")?;
        let client_secret = required(client_secret, "client secret")?;
        let user_agent = required(user_agent, "user agent")?;
        Ok(Self {
            client_id,
            client_secret,
            user_agent,
        })
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Read-only Reddit client using the application-only OAuth grant.
#[derive(Debug, Clone)]
pub struct RedditClient {
    http: reqwest::Client,
    credentials: RedditCredentials,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl RedditClient {
    /// `http` must not follow redirects; a redirect marks a non-submission url.
    pub fn new(http: reqwest::Client, credentials: RedditCredentials) -> Self {
        Self {
            http,
            credentials,
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Obtains a token so bad credentials surface before any collection.
    pub async fn verify(&self) -> Result<(), RedditError> {
        self.access_token().await?;
        info!(user_agent = %self.credentials.user_agent, "reddit credentials verified");
        Ok(())
    }

    pub async fn fetch_thread(&self, post: &PostUrl) -> Result<Submission, RedditError> {
        let id = submission_id_from_url(post.as_str())
            .ok_or_else(|| RedditError::InvalidUrl(post.to_string()))?;
        let listings: Vec<Listing> = self
            .get(
                &format!("/comments/{id}"),
                &[("raw_json", "1"), ("limit", COMMENT_LIMIT)],
                post,
            )
            .await?;
        let mut listings = listings.into_iter();
        let link = listings
            .next()
            .and_then(|listing| {
                listing.data.children.into_iter().find_map(|thing| match thing {
                    Thing::Link(link) => Some(link),
                    _ => None,
                })
            })
            .ok_or_else(|| RedditError::InvalidResponse("missing submission".to_string()))?;
        let comments = listings
            .next()
            .map(|listing| listing.data.children)
            .unwrap_or_default();

        let mut walk = TreeWalk::default();
        walk.visit(comments);
        while let Some(pending) = walk.next_pending() {
            match pending {
                Pending::Children(ids) => {
                    for chunk in ids.chunks(MORE_CHILDREN_BATCH) {
                        let things = self.more_children(&link.id, chunk, post).await?;
                        walk.visit(things);
                    }
                }
                Pending::Thread(parent) => {
                    let things = self.comment_subtree(&link.id, &parent, post).await?;
                    walk.visit(things);
                }
            }
        }
        let comments = walk.into_comments();
        debug!(submission = %link.id, comments = comments.len(), "comment tree expanded");
        Ok(Submission {
            id: link.id,
            title: link.title,
            url: format!("{WEB_BASE_URL}{}", link.permalink),
            comments,
        })
    }

    async fn more_children(
        &self,
        link_id: &str,
        children: &[String],
        post: &PostUrl,
    ) -> Result<Vec<Thing>, RedditError> {
        let link = format!("t3_{link_id}");
        let children = children.join(",");
        let response: MoreChildrenResponse = self
            .get(
                "/api/morechildren",
                &[
                    ("api_type", "json"),
                    ("raw_json", "1"),
                    ("link_id", link.as_str()),
                    ("children", children.as_str()),
                ],
                post,
            )
            .await?;
        if !response.json.errors.is_empty() {
            return Err(RedditError::InvalidResponse(format!(
                "morechildren errors: {:?}",
                response.json.errors
            )));
        }
        Ok(response
            .json
            .data
            .map(|data| data.things)
            .unwrap_or_default())
    }

    async fn comment_subtree(
        &self,
        link_id: &str,
        comment_id: &str,
        post: &PostUrl,
    ) -> Result<Vec<Thing>, RedditError> {
        let listings: Vec<Listing> = self
            .get(
                &format!("/comments/{link_id}"),
                &[
                    ("raw_json", "1"),
                    ("limit", COMMENT_LIMIT),
                    ("comment", comment_id),
                ],
                post,
            )
            .await?;
        Ok(listings
            .into_iter()
            .nth(1)
            .map(|listing| listing.data.children)
            .unwrap_or_default())
    }

    async fn get<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        post: &PostUrl,
    ) -> Result<T, RedditError>
    where
        T: DeserializeOwned,
    {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{API_ENDPOINT}{path}"))
            .bearer_auth(token)
            .header(USER_AGENT, &self.credentials.user_agent)
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if status.is_redirection() {
            return Err(RedditError::Redirect(post.to_string()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RedditError::NotFound(post.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
            return Err(RedditError::OAuth(format!("unauthorized request to {path}")));
        }
        let body = response.error_for_status()?.text().await?;
        from_str(&body).map_err(|err| RedditError::InvalidResponse(format!("{path}: {err}")))
    }

    async fn access_token(&self) -> Result<String, RedditError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.value.clone());
        }
        let token = self.request_token(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn request_token(&self, now: DateTime<Utc>) -> Result<AccessToken, RedditError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .header(USER_AGENT, &self.credentials.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RedditError::OAuth(format!(
                "token request rejected: status {status}"
            )));
        }
        if !status.is_success() {
            return Err(RedditError::InvalidResponse(format!(
                "token request failed: status {status}, body {body}"
            )));
        }
        parse_token(&body, now)
    }
}

impl DiscussionSource for RedditClient {
    async fn fetch_submission(&self, post: &PostUrl) -> Result<Submission, SourceError> {
        Ok(self.fetch_thread(post).await?)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, RedditError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RedditError::MissingCredentials(field));
    }
    Ok(trimmed.to_string())
}

fn parse_token(body: &str, now: DateTime<Utc>) -> Result<AccessToken, RedditError> {
    let payload: TokenResponse = from_str(body)
        .map_err(|_| RedditError::InvalidResponse(format!("invalid token payload: {body}")))?;
    if let Some(error) = payload.error {
        return Err(RedditError::OAuth(error));
    }
    let value = payload
        .access_token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| RedditError::InvalidResponse("missing token".to_string()))?;
    let expires_in = payload.expires_in.unwrap_or(3600);
    Ok(AccessToken {
        value,
        expires_at: now + Duration::seconds(expires_in),
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Thing>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::from_str;

    use super::{
        parse_token, AccessToken, MoreChildrenResponse, RedditCredentials, RedditError,
    };
    use giveaway_core::domain::collector::SourceError;

    #[test]
    fn credentials_require_every_field() {
        assert!(matches!(
            RedditCredentials::new("id", "  ", "agent/1.0"),
            Err(RedditError::MissingCredentials("client secret"))
        ));
        let credentials = RedditCredentials::new(" id ", "secret", "agent/1.0").unwrap();
        assert_eq!(credentials.client_id, "id");
    }

    #[test]
    fn parse_token_reads_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let token = parse_token(
            r#"{"access_token":"abc","token_type":"bearer","expires_in":86400,"scope":"*"}"#,
            now,
        )
        .unwrap();
        assert_eq!(token.value, "abc");
        assert_eq!(token.expires_at, now + Duration::seconds(86400));
    }

    #[test]
    fn parse_token_surfaces_oauth_errors() {
        let now = Utc::now();
        assert!(matches!(
            parse_token(r#"{"error":"invalid_grant"}"#, now),
            Err(RedditError::OAuth(message)) if message == "invalid_grant"
        ));
        assert!(matches!(
            parse_token(r#"{"access_token":""}"#, now),
            Err(RedditError::InvalidResponse(_))
        ));
    }

    #[test]
    fn token_freshness_keeps_margin() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let token = AccessToken {
            value: "abc".to_string(),
            expires_at: now + Duration::seconds(30),
        };
        assert!(!token.is_fresh(now));
        let token = AccessToken {
            value: "abc".to_string(),
            expires_at: now + Duration::seconds(3600),
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn errors_map_to_source_errors() {
        assert_eq!(
            SourceError::from(RedditError::InvalidUrl("u".to_string())),
            SourceError::NotASubmission("u".to_string())
        );
        assert_eq!(
            SourceError::from(RedditError::Redirect("u".to_string())),
            SourceError::NotASubmission("u".to_string())
        );
        assert_eq!(
            SourceError::from(RedditError::NotFound("u".to_string())),
            SourceError::SubmissionNotFound("u".to_string())
        );
        assert!(matches!(
            SourceError::from(RedditError::OAuth("expired".to_string())),
            SourceError::Other(message) if message == "oauth error: expired"
        ));
    }

    #[test]
    fn more_children_payload_decodes() {
        let raw = r#"{"json":{"errors":[],"data":{"things":[
            {"kind":"t1","data":{"id":"c9","author":"dave","replies":""}},
            {"kind":"more","data":{"id":"c10","parent_id":"t1_c9","children":["c10"],"count":1}}
        ]}}}"#;
        let response: MoreChildrenResponse = from_str(raw).unwrap();
        assert!(response.json.errors.is_empty());
        assert_eq!(response.json.data.unwrap().things.len(), 2);
    }
}
