//! DigitalOcean API client
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::response::Response;
use crate::cancel::CancellationToken;
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, ErrorBody, Result};
use crate::kubernetes::KubernetesService;

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com/";

const USER_AGENT: &str = concat!("doks/", env!("CARGO_PKG_VERSION"));

/// Body placeholder for requests that carry none
pub(crate) const NO_BODY: Option<&()> = None;

/// Main DigitalOcean API client
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct DoClient {
    client: Client,
    base_url: Url,
}

impl DoClient {
    /// Create a client against the public API endpoint
    pub fn new(api_token: &str) -> Result<Self> {
        Self::with_base_url(api_token, DEFAULT_API_URL)
    }

    /// Create a client against a custom endpoint
    pub fn with_base_url(api_token: &str, base_url: &str) -> Result<Self> {
        Self::build(api_token, base_url, None, None)
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &ClientConfig, api_token: &str) -> Result<Self> {
        Self::build(
            api_token,
            &config.api_url,
            config.timeout_secs,
            config.user_agent.as_deref(),
        )
    }

    fn build(
        api_token: &str,
        base_url: &str,
        timeout_secs: Option<u64>,
        user_agent: Option<&str>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", api_token))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(user_agent.unwrap_or(USER_AGENT));
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Kubernetes endpoints of the API
    pub fn kubernetes(&self) -> KubernetesService {
        KubernetesService::new(self.clone())
    }

    /// Base URL every path is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an absolute URL from path segments
    ///
    /// Every segment is percent-encoded as a single path segment. Empty, `.`
    /// and `..` segments are rejected since they would be dropped or collapsed.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(Error::InvalidPathSegment(bad.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build a request; a `None` body sends no body at all
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<RequestBuilder> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
            request = request.body(payload);
        }
        Ok(request)
    }

    /// Execute a request and decode the JSON body into `T`
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        token: &CancellationToken,
        request: RequestBuilder,
    ) -> Result<(T, Response)> {
        let (body, response) = self.execute(token, request).await?;
        match serde_json::from_slice(&body) {
            Ok(value) => Ok((value, response)),
            Err(source) => Err(Error::Decode {
                source,
                response: Box::new(response),
            }),
        }
    }

    /// Execute a request and hand back the body untouched
    pub async fn execute_raw(
        &self,
        token: &CancellationToken,
        request: RequestBuilder,
    ) -> Result<(Vec<u8>, Response)> {
        self.execute(token, request).await
    }

    /// Execute a request whose body carries nothing of interest
    pub async fn execute_empty(
        &self,
        token: &CancellationToken,
        request: RequestBuilder,
    ) -> Result<Response> {
        let (_, response) = self.execute(token, request).await?;
        Ok(response)
    }

    /// Make a GET request and decode the JSON body
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        token: &CancellationToken,
        url: Url,
    ) -> Result<(T, Response)> {
        let request = self.new_request(Method::GET, url, NO_BODY)?;
        self.execute_json(token, request).await
    }

    /// Make a request with an optional JSON body and decode the JSON answer
    pub(crate) async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        token: &CancellationToken,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(T, Response)> {
        let request = self.new_request(method, url, body)?;
        self.execute_json(token, request).await
    }

    /// Make a request with an optional JSON body, ignoring the answer body
    pub(crate) async fn send_empty<B: Serialize + ?Sized>(
        &self,
        token: &CancellationToken,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Response> {
        let request = self.new_request(method, url, body)?;
        self.execute_empty(token, request).await
    }

    /// Run the exchange under the cancellation token and check the status
    async fn execute(
        &self,
        token: &CancellationToken,
        request: RequestBuilder,
    ) -> Result<(Vec<u8>, Response)> {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let exchange = async {
            let http = request.send().await?;
            let response = Response::new(http.status(), http.headers().clone());
            let body = http.bytes().await?;
            Ok::<_, Error>((body.to_vec(), response))
        };

        let (body, response) = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Error::Cancelled),
            result = exchange => result?,
        };

        if response.status.is_success() {
            return Ok((body, response));
        }

        warn!("API request failed with status {}", response.status);
        Err(Error::Api(Box::new(api_error(response, &body))))
    }
}

/// Build the error for a non-2xx answer, falling back to the raw body text
fn api_error(response: Response, body: &[u8]) -> ApiError {
    let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        String::from_utf8_lossy(body).trim().to_string()
    } else {
        parsed.message
    };

    ApiError {
        response,
        id: parsed.id,
        message,
        request_id: parsed.request_id,
    }
}

/// Append query parameters, leaving the URL untouched when there are none
pub(crate) fn with_query<K, V>(mut url: Url, pairs: &[(K, V)]) -> Url
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key.as_ref(), value.as_ref());
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_client_creation() {
        let result = DoClient::new("test-token");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            DoClient::with_base_url("test-token", "not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            DoClient::with_base_url("test-token", "mailto:ops@example.com"),
            Err(Error::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_invalid_token_header() {
        assert!(matches!(
            DoClient::new("bad\ntoken"),
            Err(Error::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = DoClient::new("test-token").unwrap();
        let url = client
            .endpoint(&["v2", "kubernetes", "clusters", "8d91899c-0739"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.digitalocean.com/v2/kubernetes/clusters/8d91899c-0739"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = DoClient::with_base_url("test-token", "http://localhost:8080/proxy/").unwrap();
        let url = client.endpoint(&["v2", "kubernetes", "options"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/v2/kubernetes/options");
    }

    #[test]
    fn test_endpoint_encodes_each_segment_once() {
        let client = DoClient::new("test-token").unwrap();
        let url = client
            .endpoint(&["v2", "kubernetes", "clusters", "id", "node_pools_template", "pool a/b"])
            .unwrap();
        assert_eq!(
            url.path(),
            "/v2/kubernetes/clusters/id/node_pools_template/pool%20a%2Fb"
        );
    }

    #[test]
    fn test_endpoint_rejects_vanishing_segments() {
        let client = DoClient::new("test-token").unwrap();
        for id in ["", ".", ".."] {
            let err = client
                .endpoint(&["v2", "kubernetes", "clusters", id, "node_pools"])
                .unwrap_err();
            assert!(
                matches!(&err, Error::InvalidPathSegment(segment) if segment == id),
                "unexpected error for {:?}: {}",
                id,
                err
            );
        }

        let url = client
            .endpoint(&["v2", "kubernetes", "clusters", "...", "node_pools"])
            .unwrap();
        assert_eq!(url.path(), "/v2/kubernetes/clusters/.../node_pools");
    }

    #[test]
    fn test_with_query() {
        let url = Url::parse("https://api.digitalocean.com/v2/kubernetes/clusters").unwrap();
        let empty: &[(&str, &str)] = &[];
        assert_eq!(with_query(url.clone(), empty).as_str(), url.as_str());

        let url = with_query(url, &[("page", "2"), ("per_page", "20")]);
        assert_eq!(url.query(), Some("page=2&per_page=20"));
    }

    #[test]
    fn test_api_error_falls_back_to_body_text() {
        let response = Response::new(StatusCode::BAD_GATEWAY, Default::default());
        let err = api_error(response, b"upstream unavailable\n");
        assert_eq!(err.id, "");
        assert_eq!(err.message, "upstream unavailable");

        let response = Response::new(StatusCode::NOT_FOUND, Default::default());
        let err = api_error(
            response,
            br#"{"id":"not_found","message":"cluster not found","request_id":"r-1"}"#,
        );
        assert_eq!(err.id, "not_found");
        assert_eq!(err.message, "cluster not found");
        assert_eq!(err.request_id.as_deref(), Some("r-1"));
    }
}
