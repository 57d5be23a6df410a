//! Error types returned by the DigitalOcean API client
use crate::api::Response;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while talking to the API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured base URL cannot carry path segments
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The API token cannot be sent as a header value
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// A request path or query could not be composed
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A path identifier is empty or a dot segment and would not survive as a literal segment
    #[error("invalid path segment {0:?}")]
    InvalidPathSegment(String),

    /// The request body could not be serialized
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The cancellation token fired before or while the request was in flight
    #[error("request cancelled")]
    Cancelled,

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("{0}")]
    Api(Box<ApiError>),

    /// A 2xx response body did not match the expected envelope
    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        response: Box<Response>,
    },
}

impl Error {
    /// Response metadata attached to the error, when the server answered at all
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Api(err) => Some(&err.response),
            Error::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Whether the call was aborted through its cancellation token
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Non-2xx answer from the API
#[derive(Debug)]
pub struct ApiError {
    /// Status, headers, pagination and rate-limit info of the failed call
    pub response: Response,
    /// Machine readable error id, e.g. `not_found`
    pub id: String,
    pub message: String,
    pub request_id: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API error {}", self.response.status)?;
        if !self.id.is_empty() {
            write!(f, " ({})", self.id)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " [request id: {}]", request_id)?;
        }
        Ok(())
    }
}

/// Error body returned by the API
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_api_error_display() {
        let err = ApiError {
            response: Response::new(StatusCode::NOT_FOUND, Default::default()),
            id: "not_found".to_string(),
            message: "The resource you requested could not be found.".to_string(),
            request_id: Some("abc-123".to_string()),
        };

        let text = Error::Api(Box::new(err)).to_string();
        assert!(text.contains("404"));
        assert!(text.contains("not_found"));
        assert!(text.contains("could not be found"));
        assert!(text.contains("abc-123"));
    }

    #[test]
    fn test_cancelled_has_no_response() {
        let err = Error::Cancelled;
        assert!(err.is_cancelled());
        assert!(err.response().is_none());
        assert_eq!(err.to_string(), "request cancelled");
    }
}
