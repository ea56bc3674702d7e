use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;

use miro_connector_application::RateLimitStatus;

const LIMIT_HEADER: &str = "X-RateLimit-Limit";
const REMAINING_HEADER: &str = "X-RateLimit-Remaining";
const RESET_HEADER: &str = "X-RateLimit-Reset";

/// Reads the rate-limit headers; `None` unless both counters are present.
pub(super) fn from_headers(headers: &HeaderMap) -> Option<RateLimitStatus> {
    let limit = header_value::<u64>(headers, LIMIT_HEADER)?;
    let remaining = header_value::<u64>(headers, REMAINING_HEADER)?;
    let reset_at = header_value::<i64>(headers, RESET_HEADER)
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0));

    Some(RateLimitStatus {
        limit,
        remaining,
        reset_at,
    })
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
