//! Twitter platform implementation
//!
//! Talks to the v1.1 REST endpoints with OAuth 1.0a user-context signing:
//! `statuses/user_timeline` for the duplicate guard, `media/upload` for images
//! and `statuses/update` for the post itself. Requests are signed with
//! `oauth1_request`; query and form parameters take part in the signature,
//! multipart bodies do not.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::num::NonZeroU64;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::caption::CAPTION_LIMIT;
use crate::config::TwitterConfig;
use crate::error::{ConfigError, PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{ImageMimeType, PostRecord};

/// Timestamp layout used by v1.1 payloads, e.g. `Wed Oct 10 20:19:24 +0000 2018`
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(oauth1_request::Request)]
struct UserTimeline<'a> {
    count: u32,
    screen_name: &'a str,
}

#[derive(oauth1_request::Request)]
struct StatusUpdate<'a> {
    media_ids: &'a str,
    status: &'a str,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    id_str: String,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    id_str: String,
}

/// Consumer and access-token credentials for one account
struct Credentials {
    consumer_key: String,
    consumer_secret: SecretString,
    access_token: String,
    access_secret: SecretString,
}

impl Credentials {
    fn from_config(config: &TwitterConfig) -> Self {
        Self {
            consumer_key: config.consumer_key.clone(),
            consumer_secret: SecretString::from(config.consumer_secret.expose_secret().to_string()),
            access_token: config.access_token.clone(),
            access_secret: SecretString::from(config.access_secret.expose_secret().to_string()),
        }
    }

    /// `Authorization` header value with a fresh nonce and timestamp
    fn authorize<R: oauth1_request::Request>(&self, method: &Method, uri: &str, request: &R) -> String {
        self.authorize_with(method, uri, request, None, None)
    }

    fn authorize_with<R: oauth1_request::Request>(
        &self,
        method: &Method,
        uri: &str,
        request: &R,
        nonce: Option<&str>,
        timestamp: Option<NonZeroU64>,
    ) -> String {
        let client = oauth1_request::Credentials::new(
            self.consumer_key.as_str(),
            self.consumer_secret.expose_secret(),
        );
        let token = oauth1_request::Credentials::new(
            self.access_token.as_str(),
            self.access_secret.expose_secret(),
        );

        let mut builder = oauth1_request::Builder::new(client, oauth1_request::HMAC_SHA1);
        builder
            .token(token)
            .nonce(nonce)
            .timestamp(timestamp)
            .version(true);

        if *method == Method::GET {
            builder.get(uri, request)
        } else {
            builder.post(uri, request)
        }
    }
}

/// Twitter platform client
pub struct TwitterClient {
    http: reqwest::Client,
    credentials: Credentials,
    account: String,
    api_base: Url,
    upload_base: Url,
}

impl TwitterClient {
    /// Create a client from the `[twitter]` config section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either base URL is malformed.
    pub fn from_config(config: &TwitterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            credentials: Credentials::from_config(config),
            account: config.account.clone(),
            api_base: parse_base("twitter.api_base", &config.api_base)?,
            upload_base: parse_base("twitter.upload_base", &config.upload_base)?,
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn timeline_url(&self) -> Result<Url> {
        endpoint(&self.api_base, "1.1/statuses/user_timeline.json")
    }

    pub fn upload_url(&self) -> Result<Url> {
        endpoint(&self.upload_base, "1.1/media/upload.json")
    }

    pub fn update_url(&self) -> Result<Url> {
        endpoint(&self.api_base, "1.1/statuses/update.json")
    }

    async fn read_body(response: reqwest::Response, context: &str) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Network(format!("Twitter {} response: {}", context, e)))?;

        if !status.is_success() {
            return Err(map_status_error(status, &body, context).into());
        }
        Ok(body)
    }
}

fn parse_base(field: &str, value: &str) -> Result<Url> {
    // a trailing slash keeps `join` from dropping the last path segment
    let value = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{}/", value)
    };

    Url::parse(&value).map_err(|e| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| PlatformError::Posting(format!("Invalid endpoint {}: {}", path, e)).into())
}

/// Parse a v1.1 `created_at` value into UTC
pub fn parse_created_at(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            PlatformError::Posting(format!("Unexpected created_at '{}': {}", value, e)).into()
        })
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        PlatformError::Posting(format!("Unexpected Twitter {} response: {}", context, e)).into()
    })
}

fn network_error(error: reqwest::Error, context: &str) -> PlatformError {
    PlatformError::Network(format!(
        "Twitter request failed ({}): {}. Check your internet connection.",
        context, error
    ))
}

/// Map a failed HTTP status to a platform error
pub fn map_status_error(status: StatusCode, body: &str, context: &str) -> PlatformError {
    match status.as_u16() {
        401 | 403 => PlatformError::Authentication(format!(
            "Twitter authentication failed ({}): HTTP {} {}. \
             Suggestion: Verify the consumer key/secret and access token/secret in your config.",
            context, status, body
        )),
        400 | 422 => PlatformError::Validation(format!(
            "Twitter rejected the request ({}): HTTP {} {}",
            context, status, body
        )),
        429 => PlatformError::RateLimit(format!(
            "Twitter rate limit exceeded ({}): HTTP {}",
            context, status
        )),
        500..=599 => PlatformError::Network(format!(
            "Twitter server error ({}): HTTP {}",
            context, status
        )),
        _ => PlatformError::Posting(format!(
            "Twitter HTTP error ({}): HTTP {} {}",
            context, status, body
        )),
    }
}

#[async_trait]
impl Platform for TwitterClient {
    fn name(&self) -> &str {
        "twitter"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(CAPTION_LIMIT)
    }

    async fn latest_post(&self) -> Result<Option<PostRecord>> {
        let url = self.timeline_url()?;
        let request = UserTimeline {
            count: 1,
            screen_name: &self.account,
        };
        let auth = self
            .credentials
            .authorize(&Method::GET, url.as_str(), &request);

        tracing::debug!("Fetching latest post for @{}", self.account);
        let response = self
            .http
            .get(oauth1_request::to_query(url.to_string(), &request))
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| network_error(e, "user timeline"))?;

        let body = Self::read_body(response, "user timeline").await?;
        let entries: Vec<TimelineEntry> = parse_json(&body, "user timeline")?;

        match entries.into_iter().next() {
            Some(entry) => Ok(Some(PostRecord {
                created_at: parse_created_at(&entry.created_at)?,
                id: entry.id_str,
            })),
            None => Ok(None),
        }
    }

    async fn upload_media(&self, path: &Path, mime_type: ImageMimeType) -> Result<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PlatformError::Posting(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("image.{}", mime_type.extension()));

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_type.as_str())
            .map_err(|e| PlatformError::Posting(format!("Invalid media type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("media", part);

        let url = self.upload_url()?;
        let auth = self.credentials.authorize(&Method::POST, url.as_str(), &());

        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network_error(e, "media upload"))?;

        let body = Self::read_body(response, "media upload").await?;
        let uploaded: MediaUploadResponse = parse_json(&body, "media upload")?;
        Ok(uploaded.media_id_string)
    }

    async fn create_post(&self, text: &str, media_ids: &[String]) -> Result<String> {
        let media_ids = media_ids.join(",");
        let request = StatusUpdate {
            media_ids: &media_ids,
            status: text,
        };

        let url = self.update_url()?;
        let auth = self
            .credentials
            .authorize(&Method::POST, url.as_str(), &request);

        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(oauth1_request::to_form(&request))
            .send()
            .await
            .map_err(|e| network_error(e, "status update"))?;

        let body = Self::read_body(response, "status update").await?;
        let status: StatusResponse = parse_json(&body, "status update")?;
        tracing::debug!("Posted to Twitter: {}", status.id_str);

        Ok(status.id_str)
    }
}
