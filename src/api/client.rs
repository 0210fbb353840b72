use super::types::{
    CreateQuoteRequest, LoginRequest, LoginResponse, MediaUpload, Quote, QuotePage,
    UploadResponse,
};
use futures::StreamExt;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum accepted response body (5MB).
const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Not authorized (status {0})")]
    Unauthorized(u16),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response did not contain a {0}")]
    MissingField(&'static str),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

impl ApiError {
    /// True when the service rejected the credentials or session token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Thin wrapper over the quotes REST API and the media upload endpoint.
///
/// No retry, backoff or caching: every call maps to exactly one request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    media_upload_url: Url,
}

impl ApiClient {
    /// Build a client with its own connection pool and a per-request timeout.
    pub fn new(base_url: &str, media_upload_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;
        Self::with_client(http, base_url, media_upload_url)
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        media_upload_url: &str,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http,
            base_url: parse_secure_url(base_url)?,
            media_upload_url: parse_secure_url(media_upload_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /login {username, otp} -> {token}`
    pub async fn login(&self, username: &str, otp: &str) -> Result<SecretString, ApiError> {
        let url = self.endpoint("login")?;
        tracing::debug!(%url, username = %username, "Logging in");

        let request = self.http.post(url).json(&LoginRequest { username, otp });
        let response: LoginResponse = self.send_json(request).await?;

        match response.token {
            Some(token) if !token.is_empty() => Ok(SecretString::from(token)),
            _ => Err(ApiError::MissingField("token")),
        }
    }

    /// `GET /getQuotes?limit&offset` with the raw token as `Authorization`.
    pub async fn list_quotes(
        &self,
        token: &SecretString,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Quote>, ApiError> {
        let mut url = self.endpoint("getQuotes")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        tracing::debug!(limit, offset, "Fetching quote page");

        let request = self
            .http
            .get(url)
            .header(AUTHORIZATION, token.expose_secret());
        let page: QuotePage = self.send_json(request).await?;
        Ok(page.data)
    }

    /// `POST /postQuote {text, mediaUrl}`.
    ///
    /// Returns the created quote when the service echoes one back in a
    /// recognizable shape; the call counts as successful either way.
    pub async fn create_quote(
        &self,
        token: &SecretString,
        text: &str,
        media_url: &str,
    ) -> Result<Option<Quote>, ApiError> {
        let url = self.endpoint("postQuote")?;
        tracing::debug!(text_len = text.len(), "Creating quote");

        let request = self
            .http
            .post(url)
            .header(AUTHORIZATION, token.expose_secret())
            .json(&CreateQuoteRequest { text, media_url });
        let body = self.send(request).await?;

        Ok(serde_json::from_slice::<Quote>(&body).ok())
    }

    /// Multipart upload of a single `file` field. Returns the hosted URL.
    pub async fn upload_media(&self, upload: MediaUpload) -> Result<String, ApiError> {
        tracing::debug!(
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            mime = upload.mime,
            "Uploading media"
        );
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self.http.post(self.media_upload_url.clone()).multipart(form);
        let response: UploadResponse = self.send_json(request).await?;

        match response.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ApiError::MissingField("url")),
        }
    }

    /// Join a single path segment onto the base URL, keeping any base path.
    fn endpoint(&self, segment: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!(status = status.as_u16(), "Request rejected as unauthorized");
            return Err(ApiError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Request failed");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, MAX_RESPONSE_SIZE).await
    }
}

/// Parse a service URL, refusing plain HTTP except for local test servers.
fn parse_secure_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" => {
            let is_localhost = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
            if is_localhost {
                tracing::warn!(url = %url, "Using non-HTTPS service URL (localhost only)");
                Ok(url)
            } else {
                tracing::error!(url = %url, "Rejecting non-HTTPS service URL");
                Err(ApiError::InsecureBaseUrl)
            }
        }
        other => Err(ApiError::InvalidUrl(format!("unsupported scheme {other}"))),
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
