//! End-to-end tests for the GitHub release source, driven through a local
//! mock server

use chrono::{TimeZone, Utc};
use drivermgr::{
    AssetNaming, BinarySource, DriverRelease, GitHubProject, GitHubSource, HttpClient,
    LastUpdateCache, ReleaseFields, SourceError,
};
use drivermgr_testkit::{asset, empty_page, release, release_body, releases_body, temp_cache_dir};
use mockito::{Matcher, Server};
use std::path::Path;

const KEY: &str = "acme@driver";
const JAN_2022_HTTP: &str = "Sat, 01 Jan 2022 00:00:00 GMT";

/// Naming policy of the fictional `acme/driver` project: versioned tarballs
/// for 64-bit Linux
struct LinuxArchiveNaming;

impl AssetNaming for LinuxArchiveNaming {
    fn asset_name_regex(&self, version: &str) -> String {
        format!(r"driver-{version}-linux64\.tar\.gz")
    }
}

fn source_for(server: &Server, cache_root: &Path) -> GitHubSource {
    GitHubSource::new(
        GitHubProject::new("acme", "driver"),
        Box::new(HttpClient::new().unwrap()),
        LastUpdateCache::new(cache_root),
        Box::new(LinuxArchiveNaming),
    )
    .unwrap()
    .with_api_base(&server.url())
    .unwrap()
}

fn cached_release() -> DriverRelease {
    DriverRelease {
        version: "v1.0.0".to_string(),
        download_url: Some("https://example.com/driver-v1.0.0-linux64.tar.gz".to_string()),
    }
}

#[test]
fn test_latest_release_resolves_and_caches() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .match_header("if-modified-since", Matcher::Missing)
        .with_status(200)
        .with_header("Last-Modified", JAN_2022_HTTP)
        .with_body(release_body(
            "v1.2.3",
            vec![
                asset(
                    "driver-v1.2.3-win64.zip",
                    "https://example.com/driver-v1.2.3-win64.zip",
                ),
                asset(
                    "driver-v1.2.3-linux64.tar.gz",
                    "https://example.com/driver-v1.2.3-linux64.tar.gz",
                ),
            ],
        ))
        .create();

    let source = source_for(&server, temp.path());
    let resolved = source.latest_release().unwrap();

    mock.assert();
    assert_eq!(resolved.version, "v1.2.3");
    assert_eq!(
        resolved.download_url.as_deref(),
        Some("https://example.com/driver-v1.2.3-linux64.tar.gz")
    );

    // The resolution is recorded for later conditional fetches
    let cache = LastUpdateCache::new(temp.path());
    assert_eq!(cache.load(KEY).unwrap(), resolved);
    assert_eq!(
        cache.last_modification_of(KEY).unwrap(),
        Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn test_latest_release_serves_cache_on_not_modified() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let cache = LastUpdateCache::new(temp.path());
    cache
        .store(
            &cached_release(),
            KEY,
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();

    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .match_header("if-modified-since", JAN_2022_HTTP)
        .with_status(304)
        .create();

    let source = source_for(&server, temp.path());
    let resolved = source.latest_release().unwrap();

    mock.assert();
    assert_eq!(resolved, cached_release());
}

#[test]
fn test_latest_release_without_payload_or_cache_fails() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .match_header("if-modified-since", Matcher::Missing)
        .with_status(304)
        .create();

    let source = source_for(&server, temp.path());
    let err = source.latest_release().unwrap_err();

    mock.assert();
    assert!(matches!(err, SourceError::NoCachedRelease { key } if key == KEY));
}

#[test]
fn test_latest_release_falls_back_to_cache_on_anomalous_payload() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let cache = LastUpdateCache::new(temp.path());
    cache
        .store(
            &cached_release(),
            KEY,
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();

    // GitHub error payloads are JSON objects without a tag field
    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .with_status(500)
        .with_body(r#"{"message": "Server Error"}"#)
        .create();

    let source = source_for(&server, temp.path());
    let resolved = source.latest_release().unwrap();

    mock.assert();
    assert_eq!(resolved, cached_release());
}

#[test]
fn test_latest_release_rate_limit_message_without_cache() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .with_status(403)
        .with_header("X-RateLimit-Remaining", "0")
        // 2022-01-01T00:00:00Z
        .with_header("X-RateLimit-Reset", "1640995200")
        .with_body(r#"{"message": "API rate limit exceeded"}"#)
        .create();

    let source = source_for(&server, temp.path());
    let err = source.latest_release().unwrap_err();

    mock.assert();
    assert!(matches!(err, SourceError::AnomalousPayload { .. }));
    let message = err.to_string();
    assert!(message.contains("rate limit exceeded"));
    assert!(message.contains("latest release"));
    assert!(message.contains("2022-01-01 00:00:00 UTC"));
}

#[test]
fn test_latest_release_requires_last_modified() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    // Without a Last-Modified header the resolution cannot be cached
    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .with_status(200)
        .with_body(release_body(
            "v1.2.3",
            vec![asset(
                "driver-v1.2.3-linux64.tar.gz",
                "https://example.com/driver-v1.2.3-linux64.tar.gz",
            )],
        ))
        .create();

    let source = source_for(&server, temp.path());
    let err = source.latest_release().unwrap_err();

    mock.assert();
    assert!(matches!(err, SourceError::MissingLastModified { .. }));
    assert!(!LastUpdateCache::new(temp.path()).exists(KEY));
}

#[test]
fn test_latest_release_without_matching_asset_has_no_url() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .with_status(200)
        .with_header("Last-Modified", JAN_2022_HTTP)
        .with_body(release_body(
            "v1.2.3",
            vec![asset(
                "driver-v1.2.3-win64.zip",
                "https://example.com/driver-v1.2.3-win64.zip",
            )],
        ))
        .create();

    let source = source_for(&server, temp.path());
    let resolved = source.latest_release().unwrap();

    mock.assert();
    assert_eq!(resolved.version, "v1.2.3");
    assert_eq!(resolved.download_url, None);
    assert!(LastUpdateCache::new(temp.path()).exists(KEY));
}

#[test]
fn test_release_for_version_walks_pages_until_match() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let page_one = server
        .mock("GET", "/repos/acme/driver/releases")
        .with_body(releases_body(vec![
            release("v3.0.0", vec![]),
            release("v2.1.0", vec![]),
        ]))
        .create();
    let page_two = server
        .mock("GET", "/repos/acme/driver/releases?page=2")
        .with_body(releases_body(vec![release(
            "v2.0.0",
            vec![asset(
                "driver-v2.0.0-linux64.tar.gz",
                "https://example.com/driver-v2.0.0-linux64.tar.gz",
            )],
        )]))
        .create();
    // The walk stops at the matching release
    let page_three = server
        .mock("GET", "/repos/acme/driver/releases?page=3")
        .expect(0)
        .create();

    let source = source_for(&server, temp.path());
    let resolved = source.release_for_version("v2.0.0").unwrap();

    page_one.assert();
    page_two.assert();
    page_three.assert();
    assert_eq!(resolved.version, "v2.0.0");
    assert_eq!(
        resolved.download_url.as_deref(),
        Some("https://example.com/driver-v2.0.0-linux64.tar.gz")
    );
    // The exact-version path never touches the cache
    assert!(!LastUpdateCache::new(temp.path()).exists(KEY));
}

#[test]
fn test_release_for_version_reports_available_versions() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let page_one = server
        .mock("GET", "/repos/acme/driver/releases")
        .with_body(releases_body(vec![
            release("v1.1.0", vec![]),
            release("v1.0.0", vec![]),
        ]))
        .create();
    let page_two = server
        .mock("GET", "/repos/acme/driver/releases?page=2")
        .with_body(empty_page())
        .create();

    let source = source_for(&server, temp.path());
    let err = source.release_for_version("v9.9.9").unwrap_err();

    page_one.assert();
    page_two.assert();
    match err {
        SourceError::VersionNotFound {
            version,
            project_url,
            available,
        } => {
            assert_eq!(version, "v9.9.9");
            assert!(project_url.ends_with("/repos/acme/driver"));
            assert_eq!(available, vec!["v1.1.0", "v1.0.0"]);
        }
        other => panic!("expected VersionNotFound, got {other:?}"),
    }
}

#[test]
fn test_release_for_version_rate_limited_listing() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    // Hit once by the walk and once more for the diagnostic message
    let mock = server
        .mock("GET", "/repos/acme/driver/releases")
        .with_status(403)
        .with_header("X-RateLimit-Remaining", "0")
        .with_header("X-RateLimit-Reset", "1640995200")
        .with_body(r#"{"message": "API rate limit exceeded"}"#)
        .expect(2)
        .create();

    let source = source_for(&server, temp.path());
    let err = source.release_for_version("v1.0.0").unwrap_err();

    mock.assert();
    assert!(matches!(err, SourceError::ApiUnavailable { .. }));
    let message = err.to_string();
    assert!(message.contains("rate limit exceeded"));
    assert!(!message.contains("latest"));
    assert!(message.contains("2022-01-01 00:00:00 UTC"));
}

#[test]
fn test_release_for_version_reports_server_anomaly() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let mock = server
        .mock("GET", "/repos/acme/driver/releases")
        .with_status(502)
        .with_body("oops")
        .expect(2)
        .create();

    let source = source_for(&server, temp.path());
    let err = source.release_for_version("v1.0.0").unwrap_err();

    mock.assert();
    assert!(matches!(err, SourceError::ApiUnavailable { .. }));
    assert!(err.to_string().contains("It responded with: oops"));
}

/// Accepts any asset name; for schemas whose payloads are exercised as-is
struct AnyName;

impl AssetNaming for AnyName {
    fn asset_name_regex(&self, _version: &str) -> String {
        ".*".to_string()
    }
}

#[test]
fn test_custom_release_fields() {
    let mut server = Server::new();
    let temp = temp_cache_dir();
    let mock = server
        .mock("GET", "/repos/acme/driver/releases/latest")
        .with_status(200)
        .with_header("Last-Modified", JAN_2022_HTTP)
        .with_body(
            r#"{"version": "9.9", "files": [{"file": "driver.zip", "href": "https://example.com/driver.zip"}]}"#,
        )
        .create();

    let fields = ReleaseFields {
        tag_name: "version".to_string(),
        assets: "files".to_string(),
        asset_name: "file".to_string(),
        download_url: "href".to_string(),
    };
    let source = GitHubSource::new(
        GitHubProject::new("acme", "driver"),
        Box::new(HttpClient::new().unwrap()),
        LastUpdateCache::new(temp.path()),
        Box::new(AnyName),
    )
    .unwrap()
    .with_api_base(&server.url())
    .unwrap()
    .with_fields(fields);

    let resolved = source.latest_release().unwrap();

    mock.assert();
    assert_eq!(resolved.version, "9.9");
    assert_eq!(
        resolved.download_url.as_deref(),
        Some("https://example.com/driver.zip")
    );
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[test]
fn test_geckodriver_latest_resolves_for_the_host() {
    use drivermgr::drivers::gecko;

    let mut server = Server::new();
    let temp = temp_cache_dir();
    let mock = server
        .mock("GET", "/repos/mozilla/geckodriver/releases/latest")
        .with_status(200)
        .with_header("Last-Modified", JAN_2022_HTTP)
        .with_body(release_body(
            "v0.36.0",
            vec![
                asset(
                    "geckodriver-v0.36.0-linux64.tar.gz",
                    "https://example.com/geckodriver-v0.36.0-linux64.tar.gz",
                ),
                asset(
                    "geckodriver-v0.36.0-linux64.tar.gz.asc",
                    "https://example.com/geckodriver-v0.36.0-linux64.tar.gz.asc",
                ),
                asset(
                    "geckodriver-v0.36.0-win64.zip",
                    "https://example.com/geckodriver-v0.36.0-win64.zip",
                ),
            ],
        ))
        .create();

    let source = gecko::source(
        Box::new(HttpClient::new().unwrap()),
        LastUpdateCache::new(temp.path()),
    )
    .unwrap()
    .with_api_base(&server.url())
    .unwrap();

    let resolved = source.latest_release().unwrap();

    mock.assert();
    assert_eq!(resolved.version, "v0.36.0");
    assert_eq!(
        resolved.download_url.as_deref(),
        Some("https://example.com/geckodriver-v0.36.0-linux64.tar.gz")
    );
    assert!(LastUpdateCache::new(temp.path()).exists("mozilla@geckodriver"));
}
