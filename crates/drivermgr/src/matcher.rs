//! Asset selection by name pattern

use crate::release::ReleaseAsset;
use regex::Regex;
use thiserror::Error;

/// Finds the download URL of the first asset whose name matches `pattern`
///
/// The pattern is anchored on both sides, so it must cover the entire asset
/// name. Assets are tried in the order given (server order is authoritative).
///
/// # Returns
///
/// `Ok(None)` when no asset name matches; an absent asset is a valid
/// outcome, not an error
///
/// # Errors
///
/// Returns error if the pattern is not a valid regular expression
pub fn find_asset_url(
    assets: &[ReleaseAsset],
    pattern: &str,
) -> Result<Option<String>, PatternError> {
    let anchored = format!("^(?:{pattern})$");
    let regex = Regex::new(&anchored).map_err(|source| PatternError {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(assets
        .iter()
        .find(|asset| regex.is_match(&asset.name))
        .map(|asset| asset.download_url.clone()))
}

/// Invalid asset-name pattern
#[derive(Debug, Error)]
#[error("Invalid asset name pattern {pattern:?}: {source}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}
