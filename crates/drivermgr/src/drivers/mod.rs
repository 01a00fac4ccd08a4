//! Per-browser driver sources
//!
//! Each submodule pairs a repository with its asset naming convention and
//! exposes a `source` constructor producing a ready-to-use
//! [`GitHubSource`](crate::source::github::GitHubSource) for the host
//! platform.

pub mod gecko;
pub mod opera;

use crate::platform::{Arch, Os, PlatformError};
use crate::source::SourceError;
use thiserror::Error;

/// Driver source construction error types
#[derive(Debug, Error)]
pub enum DriverError {
    /// Host platform could not be identified
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Identified platform has no published driver build
    #[error("No {driver} build is published for {os}/{arch}")]
    UnsupportedTarget {
        /// Driver binary name
        driver: &'static str,
        /// Target operating system
        os: Os,
        /// Target architecture
        arch: Arch,
    },

    /// Underlying source could not be constructed
    #[error(transparent)]
    Source(#[from] SourceError),
}
