//! Test utilities for drivermgr
//!
//! This crate provides shared testing utilities used across the drivermgr
//! workspace: canned GitHub release payloads and temporary cache
//! directories.

mod fixtures;

pub use fixtures::{asset, empty_page, release, release_body, releases_body};

use tempfile::TempDir;

/// Creates a temporary cache directory within `.tmp/` at the project root
///
/// This ensures all test cache files are centralized in a single location
/// that is easy to clean up manually if needed.
///
/// # Returns
///
/// A `TempDir` instance that automatically cleans up on drop.
///
/// # Panics
///
/// Panics if the current directory cannot be determined or the directory
/// cannot be created.
pub fn temp_cache_dir() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");

    let tmp_base = workspace_root.join(".tmp");
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");

    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}
