//! Release resolution sources
//!
//! A [`BinarySource`] answers the two questions the installer layer asks:
//! "what is the latest release?" and "where is release X?". The GitHub
//! implementation lives in [`github`]; what a source considers a matching
//! asset is delegated to an [`AssetNaming`] policy.

pub mod github;

use crate::cache::CacheError;
use crate::http::HttpError;
use crate::matcher::PatternError;
use crate::release::{DriverRelease, ParseError};
use thiserror::Error;

/// A provider of driver binary releases
pub trait BinarySource {
    /// Resolves the most recently published release
    ///
    /// # Errors
    ///
    /// Returns error if neither the remote API nor the local cache can
    /// produce a release
    fn latest_release(&self) -> Result<DriverRelease, SourceError>;

    /// Resolves the release whose tag equals `version` exactly
    ///
    /// # Errors
    ///
    /// Returns error if no release carries that tag or the listing cannot
    /// be fetched
    fn release_for_version(&self, version: &str) -> Result<DriverRelease, SourceError>;
}

/// Produces the asset-name pattern for a release version
///
/// Each driver project names its release assets differently; implementations
/// encode one project's convention. The returned pattern is matched against
/// the entire asset name (see [`crate::matcher::find_asset_url`]).
pub trait AssetNaming {
    /// Regular expression an asset file name must match for `version`
    fn asset_name_regex(&self, version: &str) -> String;
}

/// Release resolution error types
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Cache read or write failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Payload could not be interpreted
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Naming policy produced an invalid pattern
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Request URL could not be built
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API base URL cannot carry path segments
    #[error("URL cannot be a base: {url}")]
    UrlCannotBeABase {
        /// The problematic URL
        url: url::Url,
    },

    /// Conditional fetch returned nothing and no cached release exists
    ///
    /// At least one successful fetch is required before the cache can stand
    /// in for the API.
    #[error(
        "No release payload received for {key} and no cached release is available to fall back to"
    )]
    NoCachedRelease {
        /// Cache key that was consulted
        key: String,
    },

    /// Latest-release payload was present but unusable, with no cached
    /// release to substitute
    #[error("{message}")]
    AnomalousPayload {
        /// Classified description of the server condition
        message: String,
    },

    /// Version listing yielded no releases at all
    #[error("{message}")]
    ApiUnavailable {
        /// Classified description of the server condition
        message: String,
    },

    /// Requested version does not exist in the repository
    #[error(
        "No release matching version {version} has been found in the repository {project_url}; available versions: {}",
        .available.join(", ")
    )]
    VersionNotFound {
        /// The version that was requested
        version: String,
        /// Repository the listing was read from
        project_url: String,
        /// Every version observed while walking the listing
        available: Vec<String>,
    },

    /// Successful latest-release response without a usable Last-Modified
    /// header, so no cache entry could be recorded
    #[error("Latest release response for {project} has no usable Last-Modified header: {reason}")]
    MissingLastModified {
        /// Repository the response belongs to
        project: String,
        /// Why the header was unusable
        reason: String,
    },
}
