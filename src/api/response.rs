//! Response wrapper handed back alongside every decoded payload
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::pagination::{Links, Meta};

const HEADER_RATE_LIMIT: &str = "ratelimit-limit";
const HEADER_RATE_REMAINING: &str = "ratelimit-remaining";
const HEADER_RATE_RESET: &str = "ratelimit-reset";

/// HTTP-level metadata of an API call
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Pagination links, filled in by list operations
    pub links: Option<Links>,
    /// Result-set metadata, filled in by list operations
    pub meta: Option<Meta>,
    pub rate: Rate,
}

/// Rate limit state reported by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rate {
    /// Requests allowed per hour
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the window resets
    pub reset: Option<DateTime<Utc>>,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap) -> Self {
        let rate = Rate::from_headers(&headers);
        Self {
            status,
            headers,
            links: None,
            meta: None,
            rate,
        }
    }
}

impl Rate {
    /// Parse the rate limit headers, leaving missing or malformed values at zero
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let number = |name: &str| -> Option<i64> {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok())
        };

        Self {
            limit: number(HEADER_RATE_LIMIT)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            remaining: number(HEADER_RATE_REMAINING)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            reset: number(HEADER_RATE_RESET).and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_rate_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_RATE_LIMIT, HeaderValue::from_static("5000"));
        headers.insert(HEADER_RATE_REMAINING, HeaderValue::from_static("4998"));
        headers.insert(HEADER_RATE_RESET, HeaderValue::from_static("1700000000"));

        let rate = Rate::from_headers(&headers);
        assert_eq!(rate.limit, 5000);
        assert_eq!(rate.remaining, 4998);
        assert_eq!(rate.reset.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_rate_missing_or_malformed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_RATE_LIMIT, HeaderValue::from_static("lots"));

        let rate = Rate::from_headers(&headers);
        assert_eq!(rate, Rate::default());
    }

    #[test]
    fn test_new_response_has_no_pagination() {
        let response = Response::new(StatusCode::OK, HeaderMap::new());
        assert!(response.links.is_none());
        assert!(response.meta.is_none());
    }
}
