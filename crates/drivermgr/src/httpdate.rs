//! HTTP date formatting and parsing
//!
//! `If-Modified-Since` and `Last-Modified` carry RFC 1123 dates with a
//! literal `GMT` zone. chrono's `to_rfc2822` renders `+0000` instead, so
//! formatting goes through a custom format string; parsing uses the RFC 2822
//! parser, which accepts both spellings.

use chrono::{DateTime, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Renders a timestamp as an HTTP date (e.g. `Sat, 01 Jan 2022 00:00:00 GMT`)
pub fn fmt_http_date(when: &DateTime<Utc>) -> String {
    when.format(HTTP_DATE_FORMAT).to_string()
}

/// Parses an HTTP date header value, normalized to UTC
///
/// # Errors
///
/// Returns error if the value is not a valid RFC 2822 date
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc2822(value).map(|date| date.with_timezone(&Utc))
}
