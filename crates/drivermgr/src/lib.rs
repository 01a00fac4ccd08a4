//! Browser-driver release resolution via the GitHub releases API.
//!
//! This crate answers one question for WebDriver setups: given a browser,
//! which driver release should be used and where is its binary published?
//! Resolution stays usable when GitHub is unreachable or rate-limited by
//! keeping a per-repository cache of the last successfully resolved release
//! and revalidating it with conditional requests.
//!
//! # Architecture
//!
//! - [`source`]: the [`BinarySource`] trait and its GitHub implementation,
//!   including rate-limit message classification
//! - [`release`]: release records and the configurable payload parser
//! - [`matcher`]: asset selection by naming pattern
//! - [`cache`]: the file-backed last-update cache
//! - [`http`]: the [`Transport`] seam and the blocking reqwest client
//! - [`drivers`]: ready-made sources for geckodriver and operadriver
//!
//! # Resolution Flow
//!
//! ```text
//! latest_release()
//!     ↓
//! 1. GET releases/latest with If-Modified-Since from the cache
//!     ↓ (304 / empty body)
//!     → serve the cached release (error if none exists yet)
//!     ↓ (payload)
//! 2. Parse tag + assets
//!     → no tag field: fall back to cache with a warning,
//!       or fail with a rate-limit/server message
//! 3. Match an asset name against the driver's naming pattern
//! 4. Store {release, Last-Modified} in the cache, return the release
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use drivermgr::{BinarySource, HttpClient, LastUpdateCache, default_cache_dir, drivers};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Box::new(HttpClient::new()?);
//! let cache = LastUpdateCache::new(default_cache_dir()?);
//! let gecko = drivers::gecko::source(transport, cache)?;
//!
//! let latest = gecko.latest_release()?;
//! println!("geckodriver {}: {:?}", latest.version, latest.download_url);
//!
//! let pinned = gecko.release_for_version("v0.35.0")?;
//! println!("pinned: {:?}", pinned.download_url);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod cache;
pub mod drivers;
pub mod http;
pub mod httpdate;
pub mod matcher;
pub mod platform;
pub mod release;
pub mod source;

// Re-export commonly used types
pub use cache::{CacheError, LastUpdateCache, default_cache_dir};
pub use drivers::DriverError;
pub use http::{HttpClient, HttpError, HttpResponse, Transport};
pub use release::{DriverRelease, ReleaseAsset, ReleaseFields};
pub use source::github::{GitHubProject, GitHubSource, RateLimitHeaders};
pub use source::{AssetNaming, BinarySource, SourceError};
