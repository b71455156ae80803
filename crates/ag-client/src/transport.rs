//! HTTP transport for the management API.
//!
//! Every remote operation is a single, retry-free request described by an
//! [`ApiRequest`]. Paths are relative to the organization, so
//! `environments/test/targetservers` resolves to
//! `{base_url}/{org}/environments/test/targetservers`.

use std::time::Duration;

use ag_core::ClientConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use crate::error::{ClientError, ClientResult};

/// Content type used for entity payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One request against the management API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Organization-relative path, optionally with a query string.
    pub path: String,
    /// Request payload.
    pub body: Option<Vec<u8>>,
    /// Value of the `Content-Type` header.
    pub content_type: String,
}

impl ApiRequest {
    /// Creates a request without a payload.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Creates a POST request with a payload.
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Executes single API requests.
///
/// Implementations return the raw response body for 2xx responses and a
/// [`ClientError::Api`] for every other status. They must be safe to call
/// concurrently from batch workers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request.
    async fn send(&self, request: ApiRequest) -> ClientResult<Vec<u8>>;
}

/// API client for making requests to the management API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    org_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a new API client.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ag_core::Error::missing("access token"))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            org_url: config.org_url(),
            token,
        })
    }

    /// Gets the organization URL all paths are resolved against.
    pub fn org_url(&self) -> &str {
        &self.org_url
    }

    /// Resolves an organization-relative path.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.org_url.clone()
        } else if path.starts_with('?') {
            format!("{}{}", self.org_url, path)
        } else {
            format!("{}/{}", self.org_url, path)
        }
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, request: ApiRequest) -> ClientResult<Vec<u8>> {
        let url = self.url(&request.path);
        tracing::debug!(method = %request.method, %url, "connecting");

        let mut builder = self
            .client
            .request(request.method, &url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, request.content_type);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        handle_response(response).await
    }
}

/// Handles a response, mapping non-2xx statuses to [`ClientError::Api`].
async fn handle_response(response: reqwest::Response) -> ClientResult<Vec<u8>> {
    let status = response.status();

    if status.is_success() {
        Ok(response.bytes().await?.to_vec())
    } else {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "error in response");
        Err(ClientError::Api {
            status: status.as_u16(),
            message: status_message(status.as_u16()).to_string(),
            body,
        })
    }
}

/// Describes an HTTP error status the way the platform documents it.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad Request - malformed request syntax",
        401 => "Unauthorized - the client must authenticate itself",
        403 => "Forbidden - the client does not have access rights",
        404 => "Not found - the server cannot find the requested resource",
        405 => "Method Not Allowed - the request method is not supported by the target resource",
        409 => "Conflict - request conflicts with the current state of the server",
        415 => "Unsupported media type - media format of the requested data is not supported by the server",
        429 => "Too Many Request - user has sent too many requests",
        500 => "Internal server error",
        501 => "Not Implemented - request method is not supported by the server",
        502 => "Bad Gateway",
        503 => "Service Unavailable - the server is not ready to handle the request",
        _ => "unknown error",
    }
}
