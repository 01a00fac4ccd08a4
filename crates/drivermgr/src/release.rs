//! Release records and GitHub payload parsing
//!
//! Payloads are walked through `serde_json::Value` rather than derived
//! structs because the field names are configurable per source (see
//! [`ReleaseFields`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A resolved driver release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRelease {
    /// Release tag name (e.g. "v0.36.0")
    pub version: String,
    /// Download URL of the matched asset
    ///
    /// `None` means the release exists but publishes no asset for the
    /// requested naming pattern; callers decide whether that is fatal.
    pub download_url: Option<String>,
}

/// One downloadable asset of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Asset filename (e.g. "geckodriver-v0.36.0-linux64.tar.gz")
    pub name: String,
    /// Direct download URL
    pub download_url: String,
}

/// JSON field names consumed from release payloads
///
/// Defaults match the GitHub releases API. A specialization targeting an
/// API variant can substitute its own names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFields {
    /// Field holding the release tag
    pub tag_name: String,
    /// Field holding the asset array
    pub assets: String,
    /// Field holding an asset's filename
    pub asset_name: String,
    /// Field holding an asset's download URL
    pub download_url: String,
}

impl Default for ReleaseFields {
    fn default() -> Self {
        Self {
            tag_name: "tag_name".to_string(),
            assets: "assets".to_string(),
            asset_name: "name".to_string(),
            download_url: "browser_download_url".to_string(),
        }
    }
}

/// One release parsed out of an API payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRelease {
    /// Release tag, verbatim from the payload
    pub tag: String,
    /// Assets in server order
    pub assets: Vec<ReleaseAsset>,
}

/// Parses a single-release payload (the `releases/latest` shape)
///
/// Returns `Ok(None)` when the payload parses as JSON but lacks the tag
/// field; the resolver treats that as an anomalous payload and decides
/// between cache fallback and failure.
///
/// # Errors
///
/// Returns error if the payload is not valid JSON or an asset entry lacks
/// its name or URL field
pub fn parse_release(
    payload: &str,
    fields: &ReleaseFields,
) -> Result<Option<ParsedRelease>, ParseError> {
    let value: Value = serde_json::from_str(payload)?;
    let Some(tag) = release_tag(&value, fields) else {
        return Ok(None);
    };
    let tag = tag.to_string();
    let assets = parse_assets(&value, fields)?;
    Ok(Some(ParsedRelease { tag, assets }))
}

/// Splits a listing payload into release objects
///
/// Returns `None` unless the payload is a non-empty JSON array. Anything
/// else is the shape GitHub uses to signal the end of a paginated listing,
/// or an error body that is no listing at all.
pub fn parse_release_list(payload: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(payload).ok()? {
        Value::Array(objects) if !objects.is_empty() => Some(objects),
        _ => None,
    }
}

/// Reads the tag field of one release object
pub fn release_tag<'a>(release: &'a Value, fields: &ReleaseFields) -> Option<&'a str> {
    release.get(fields.tag_name.as_str()).and_then(Value::as_str)
}

/// Parses the asset array of one release object
///
/// # Errors
///
/// Returns error if the asset array or any asset field is missing
pub fn parse_assets(release: &Value, fields: &ReleaseFields) -> Result<Vec<ReleaseAsset>, ParseError> {
    let assets = release
        .get(fields.assets.as_str())
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::MissingField {
            field: fields.assets.clone(),
        })?;

    assets
        .iter()
        .map(|asset| {
            Ok(ReleaseAsset {
                name: string_field(asset, &fields.asset_name)?,
                download_url: string_field(asset, &fields.download_url)?,
            })
        })
        .collect()
}

fn string_field(object: &Value, field: &str) -> Result<String, ParseError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
}

/// Payload parsing error types
#[derive(Debug, Error)]
pub enum ParseError {
    /// Payload is not valid JSON
    #[error("Malformed release payload: {0}")]
    Json(#[from] serde_json::Error),

    /// An expected field is absent or has the wrong type
    #[error("Release payload has no {field:?} field")]
    MissingField {
        /// Configured name of the missing field
        field: String,
    },
}
