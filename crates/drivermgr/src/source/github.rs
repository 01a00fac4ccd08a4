//! GitHub releases as a binary source
//!
//! [`GitHubSource`] resolves driver releases from a repository's releases
//! API. The latest-release path is a conditional fetch: the cached
//! `Last-Modified` time rides along as `If-Modified-Since`, and a 304 (or
//! any payload-less response) is answered from the cache. The
//! exact-version path walks the paginated listing unconditionally, since
//! the requested tag may be arbitrarily old.
//!
//! When GitHub answers with something unusable, the failure message is
//! classified: a response with the rate-limit-remaining header at zero
//! produces a rate-limit message (with the reset time when available),
//! anything else reports the raw body. Classification changes wording
//! only, never which path is taken.

use crate::cache::LastUpdateCache;
use crate::http::{HttpResponse, IF_MODIFIED_SINCE, LAST_MODIFIED, Transport};
use crate::httpdate::{fmt_http_date, parse_http_date};
use crate::matcher::find_asset_url;
use crate::release::{self, DriverRelease, ParseError, ReleaseFields};
use crate::source::{AssetNaming, BinarySource, SourceError};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Default API root
pub const GITHUB_API: &str = "https://api.github.com";

/// Repository coordinates on GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubProject {
    organization: String,
    project: String,
}

impl GitHubProject {
    /// Creates coordinates for `organization/project`
    pub fn new(organization: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
        }
    }

    /// Owning organization or user
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Repository name
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Stable cache key for this repository (`organization@project`)
    pub fn unique_key(&self) -> String {
        format!("{}@{}", self.organization, self.project)
    }
}

impl fmt::Display for GitHubProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.project)
    }
}

/// Response header names carrying rate-limit state
///
/// Defaults match api.github.com; a source talking to an API variant can
/// substitute its own names via
/// [`GitHubSource::with_rate_limit_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// Header holding the remaining request budget
    pub remaining: String,
    /// Header holding the reset time (Unix seconds)
    pub reset: String,
}

impl Default for RateLimitHeaders {
    fn default() -> Self {
        Self {
            remaining: "X-RateLimit-Remaining".to_string(),
            reset: "X-RateLimit-Reset".to_string(),
        }
    }
}

/// Resolves driver releases from one GitHub repository
///
/// All configuration is fixed at construction; an instance only reads its
/// own cache key, so one instance per repository is safe to use alongside
/// others.
pub struct GitHubSource {
    transport: Box<dyn Transport>,
    cache: LastUpdateCache,
    project: GitHubProject,
    api_base: Url,
    unique_key: String,
    fields: ReleaseFields,
    rate_limit: RateLimitHeaders,
    naming: Box<dyn AssetNaming>,
}

impl GitHubSource {
    /// Creates a source for `project` against the public GitHub API
    ///
    /// # Arguments
    ///
    /// * `project` - Repository coordinates
    /// * `transport` - HTTP transport to send requests through
    /// * `cache` - Persistent cache consulted on conditional fetches
    /// * `naming` - Asset naming policy for this repository
    ///
    /// # Errors
    ///
    /// Returns error if the default API base URL cannot be parsed
    pub fn new(
        project: GitHubProject,
        transport: Box<dyn Transport>,
        cache: LastUpdateCache,
        naming: Box<dyn AssetNaming>,
    ) -> Result<Self, SourceError> {
        let api_base = Url::parse(GITHUB_API)?;
        let unique_key = project.unique_key();
        Ok(Self {
            transport,
            cache,
            project,
            api_base,
            unique_key,
            fields: ReleaseFields::default(),
            rate_limit: RateLimitHeaders::default(),
            naming,
        })
    }

    /// Points the source at a different API root (mock servers, GitHub
    /// Enterprise)
    ///
    /// # Errors
    ///
    /// Returns error if `api_base` is not a valid URL
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, SourceError> {
        self.api_base = Url::parse(api_base)?;
        Ok(self)
    }

    /// Replaces the JSON field-name schema
    pub fn with_fields(mut self, fields: ReleaseFields) -> Self {
        self.fields = fields;
        self
    }

    /// Replaces the rate-limit header names
    pub fn with_rate_limit_headers(mut self, headers: RateLimitHeaders) -> Self {
        self.rate_limit = headers;
        self
    }

    /// Repository this source resolves
    pub fn project(&self) -> &GitHubProject {
        &self.project
    }

    /// Cache key this source stores under
    pub fn unique_key(&self) -> &str {
        &self.unique_key
    }

    fn project_url(&self) -> Result<Url, SourceError> {
        let mut url = self.api_base.clone();
        add_path_segments(
            &mut url,
            &[
                "repos",
                self.project.organization(),
                self.project.project(),
            ],
        )?;
        Ok(url)
    }

    fn releases_url(&self) -> Result<Url, SourceError> {
        let mut url = self.project_url()?;
        add_path_segments(&mut url, &["releases"])?;
        Ok(url)
    }

    fn latest_release_url(&self) -> Result<Url, SourceError> {
        let mut url = self.releases_url()?;
        add_path_segments(&mut url, &["latest"])?;
        Ok(url)
    }

    fn get_page(
        &self,
        url: &Url,
        page: u32,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, SourceError> {
        let url = paged_url(url, page);
        debug!("GET {}", url);
        Ok(self.transport.get(&url, headers)?)
    }

    /// `If-Modified-Since` from the cache, or nothing when no entry exists
    /// (an unconditional fetch)
    fn last_modification_headers(&self) -> Result<Vec<(String, String)>, SourceError> {
        if !self.cache.exists(&self.unique_key) {
            return Ok(Vec::new());
        }
        let last_modified = self.cache.last_modification_of(&self.unique_key)?;
        Ok(vec![(
            IF_MODIFIED_SINCE.to_string(),
            fmt_http_date(&last_modified),
        )])
    }

    fn resolve_from_payload(&self, response: &HttpResponse) -> Result<DriverRelease, SourceError> {
        match release::parse_release(response.payload(), &self.fields)? {
            Some(parsed) => {
                let pattern = self.naming.asset_name_regex(&parsed.tag);
                let download_url = find_asset_url(&parsed.assets, &pattern)?;
                let resolved = DriverRelease {
                    version: parsed.tag,
                    download_url,
                };

                let last_modified = self.extract_modification_date(response)?;
                self.cache
                    .store(&resolved, &self.unique_key, last_modified)?;
                Ok(resolved)
            }
            None => self.fall_back_to_cache(response),
        }
    }

    /// Handles a payload without a tag field: serve the cached release if
    /// one exists, otherwise fail with the classified message
    fn fall_back_to_cache(&self, response: &HttpResponse) -> Result<DriverRelease, SourceError> {
        let message = classification_message(response, &self.rate_limit, true);
        if !self.cache.exists(&self.unique_key) {
            return Err(SourceError::AnomalousPayload { message });
        }

        let cached = self.cache.load(&self.unique_key)?;
        warn!(
            "{} Falling back to the cached release {} as the latest one.",
            message, cached.version
        );
        Ok(cached)
    }

    fn extract_modification_date(
        &self,
        response: &HttpResponse,
    ) -> Result<DateTime<Utc>, SourceError> {
        let Some(value) = response.header(LAST_MODIFIED) else {
            return Err(SourceError::MissingLastModified {
                project: self.project.to_string(),
                reason: "header absent".to_string(),
            });
        };
        parse_http_date(value).map_err(|e| SourceError::MissingLastModified {
            project: self.project.to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Debug for GitHubSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `transport` and `naming` are trait objects without Debug
        f.debug_struct("GitHubSource")
            .field("cache", &self.cache)
            .field("project", &self.project)
            .field("api_base", &self.api_base)
            .field("unique_key", &self.unique_key)
            .field("fields", &self.fields)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

impl BinarySource for GitHubSource {
    fn latest_release(&self) -> Result<DriverRelease, SourceError> {
        let url = self.latest_release_url()?;
        let headers = self.last_modification_headers()?;
        let response = self.get_page(&url, 1, &headers)?;

        if response.has_payload() {
            self.resolve_from_payload(&response)
        } else {
            debug!(
                "nothing newer than the cached release for {}",
                self.unique_key
            );
            if !self.cache.exists(&self.unique_key) {
                return Err(SourceError::NoCachedRelease {
                    key: self.unique_key.clone(),
                });
            }
            Ok(self.cache.load(&self.unique_key)?)
        }
    }

    fn release_for_version(&self, version: &str) -> Result<DriverRelease, SourceError> {
        let url = self.releases_url()?;
        let mut page = 1;
        let mut available = Vec::new();

        loop {
            let response = self.get_page(&url, page, &[])?;
            let Some(objects) = release::parse_release_list(response.payload()) else {
                break;
            };

            for object in &objects {
                let Some(tag) = release::release_tag(object, &self.fields) else {
                    return Err(ParseError::MissingField {
                        field: self.fields.tag_name.clone(),
                    }
                    .into());
                };

                if tag == version {
                    let assets = release::parse_assets(object, &self.fields)?;
                    let pattern = self.naming.asset_name_regex(version);
                    let download_url = find_asset_url(&assets, &pattern)?;
                    return Ok(DriverRelease {
                        version: version.to_string(),
                        download_url,
                    });
                }
                available.push(tag.to_string());
            }

            page += 1;
        }

        if available.is_empty() {
            // The listing produced nothing at all; ask page 1 again and
            // report what the server is actually saying
            let diagnostic = self.get_page(&url, 1, &[])?;
            return Err(SourceError::ApiUnavailable {
                message: classification_message(&diagnostic, &self.rate_limit, false),
            });
        }

        Err(SourceError::VersionNotFound {
            version: version.to_string(),
            project_url: self.project_url()?.to_string(),
            available,
        })
    }
}

fn add_path_segments(url: &mut Url, segments: &[&str]) -> Result<(), SourceError> {
    let url_for_error = url.clone();
    url.path_segments_mut()
        .map_err(|_| SourceError::UrlCannotBeABase { url: url_for_error })?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

/// Appends the page query parameter; page 1 is the bare URL
fn paged_url(url: &Url, page: u32) -> Url {
    let mut url = url.clone();
    if page != 1 {
        url.query_pairs_mut().append_pair("page", &page.to_string());
    }
    url
}

/// Builds a human-readable message for an unusable response
///
/// Rate limiting (remaining budget header at `"0"`) gets a dedicated
/// message with the reset time when the reset header parses as Unix
/// seconds; an unparsable reset is silently omitted. Everything else
/// reports the raw body.
fn classification_message(
    response: &HttpResponse,
    headers: &RateLimitHeaders,
    latest: bool,
) -> String {
    if response.header(&headers.remaining) == Some("0") {
        let scope = if latest { "latest " } else { "" };
        let mut message = format!(
            "GitHub API rate limit exceeded. To get information about the {scope}release you need to wait until the limit is reset"
        );
        if let Some(reset) = rate_limit_reset(response, headers) {
            message.push_str(&format!(", which will be at {reset}"));
        }
        message.push('.');
        message
    } else {
        format!(
            "There is a problem on the GitHub side. It responded with: {}",
            response.payload()
        )
    }
}

fn rate_limit_reset(response: &HttpResponse, headers: &RateLimitHeaders) -> Option<DateTime<Utc>> {
    let seconds = response.header(&headers.reset)?.parse::<i64>().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}
