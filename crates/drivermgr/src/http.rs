//! HTTP transport for GitHub interactions
//!
//! The release resolver talks to the network through the [`Transport`] trait
//! so tests and embedders can substitute their own client. [`HttpClient`] is
//! the default implementation: a blocking reqwest client with a fixed
//! user-agent and timeout.
//!
//! Non-success statuses are not errors at this layer. The resolver needs the
//! headers and body of 403/5xx responses for rate-limit classification, and
//! 304 Not Modified must surface as a response without a payload.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default timeout for GitHub requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent for drivermgr requests
pub const USER_AGENT: &str = "drivermgr";

/// Media type requested from the GitHub API
pub const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

/// Request header carrying the cached modification time
pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";

/// Response header carrying the release modification time
pub const LAST_MODIFIED: &str = "Last-Modified";

/// Performs HTTP GET requests
///
/// Implementations must return the response for any status the server
/// produces; only transport-level failures (connect, timeout, invalid
/// headers) are errors.
pub trait Transport {
    /// Sends a GET request with the given extra headers
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be built or sent
    fn get(&self, url: &Url, headers: &[(String, String)]) -> Result<HttpResponse, HttpError>;
}

/// A received HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
}

impl HttpResponse {
    /// Creates a response; header names are stored lowercased
    pub fn new(status: u16, headers: Vec<(String, String)>, body: String) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the response carried a non-empty body
    ///
    /// False for 304 Not Modified and for empty 200 bodies alike.
    pub fn has_payload(&self) -> bool {
        !self.body.is_empty()
    }

    /// Response body
    pub fn payload(&self) -> &str {
        &self.body
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Blocking HTTP client with GitHub-appropriate defaults
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Builds a client with [`DEFAULT_TIMEOUT`]
    ///
    /// # Errors
    ///
    /// Returns error if client construction fails
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Builds a client with the given request timeout
    ///
    /// # Arguments
    ///
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns error if client construction fails
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(HttpError::BuildClient)?;
        Ok(Self { client })
    }
}

impl Transport for HttpClient {
    fn get(&self, url: &Url, headers: &[(String, String)]) -> Result<HttpResponse, HttpError> {
        let header_map = build_headers(headers)?;

        let response = self
            .client
            .get(url.as_str())
            .headers(header_map)
            .send()
            .map_err(|source| HttpError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().map_err(|source| HttpError::Request {
            url: url.clone(),
            source,
        })?;

        Ok(HttpResponse::new(status, response_headers, body))
    }
}

/// Converts caller headers into a reqwest header map, adding the Accept type
fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::new();
    map.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));

    for (name, value) in headers {
        let header_name =
            HeaderName::try_from(name.as_str()).map_err(|_| HttpError::InvalidHeader {
                name: name.clone(),
            })?;
        let header_value =
            HeaderValue::try_from(value.as_str()).map_err(|_| HttpError::InvalidHeader {
                name: name.clone(),
            })?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

/// Transport error types
#[derive(Debug, Error)]
pub enum HttpError {
    /// Client construction failed
    #[error("Failed to build HTTP client: {0}")]
    BuildClient(#[source] reqwest::Error),

    /// Request could not be sent or the response body could not be read
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        /// URL that failed
        url: Url,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },

    /// Caller-supplied header was rejected
    #[error("Invalid request header {name:?}")]
    InvalidHeader {
        /// Offending header name
        name: String,
    },
}
