//! Canned GitHub release payloads
//!
//! Builders for the two payload shapes the releases API produces: a single
//! release object (`releases/latest`) and an array page (`releases`).
//! Field names follow the real API so tests exercise the default schema.

use serde_json::{Value, json};

/// Builds one asset object
pub fn asset(name: &str, download_url: &str) -> Value {
    json!({
        "name": name,
        "browser_download_url": download_url,
    })
}

/// Builds one release object
///
/// Carries a release title under `name` like real payloads do, so parsers
/// confusing the release title with asset names get caught.
pub fn release(tag: &str, assets: Vec<Value>) -> Value {
    json!({
        "tag_name": tag,
        "name": format!("Release {tag}"),
        "assets": assets,
    })
}

/// Serializes a single-release payload (the `releases/latest` shape)
pub fn release_body(tag: &str, assets: Vec<Value>) -> String {
    release(tag, assets).to_string()
}

/// Serializes a listing page (the `releases` shape)
pub fn releases_body(releases: Vec<Value>) -> String {
    Value::Array(releases).to_string()
}

/// An exhausted listing page
pub fn empty_page() -> String {
    "[]".to_string()
}
