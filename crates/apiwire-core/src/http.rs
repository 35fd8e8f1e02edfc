//! Shared API client construction and request helpers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;

const USER_AGENT: &str = concat!("apiwire/", env!("CARGO_PKG_VERSION"));

/// Per-call overrides. Nothing set here is written back to the shared client.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header for this call, replacing a default header of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Pre-configured handle through which all backend calls are issued.
///
/// Cloning is cheap and clones share one connection pool. Construction does
/// no network I/O.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
    default_headers: HeaderMap,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Build`] if the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(config.default_headers.clone())
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Build)?;

        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = ?config.timeout.map(|t| t.as_millis()),
            "API client ready"
        );

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            default_headers: config.default_headers.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// The underlying `reqwest` client, with defaults applied.
    #[must_use]
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Resolve `path` against the base URL.
    ///
    /// Absolute URLs (`scheme://...` or `//host/...`) are used as-is. An empty
    /// path yields the base URL. Anything else is appended after dropping one
    /// trailing `/` from the base and every leading `/` from the path, so a base
    /// path such as `/v1` is kept and `"/"` yields the base with a trailing `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the result is not a valid URL.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        let to_err = |source| ApiError::Url {
            url: path.to_owned(),
            source,
        };

        if path.starts_with("//") {
            return self.base_url.join(path).map_err(to_err);
        }
        if is_absolute_url(path) {
            return Url::parse(path).map_err(to_err);
        }

        if path.is_empty() {
            return Ok(self.base_url.clone());
        }
        let base = self.base_url.as_str();
        let base = base.strip_suffix('/').unwrap_or(base);
        let relative = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{relative}")).map_err(to_err)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.resolve(path)?;
        tracing::debug!(%method, %url, "building request");
        Ok(self.client.request(method, url))
    }

    /// Like [`Self::request`], with call-level header and timeout overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn request_with(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<RequestBuilder, ApiError> {
        let mut req = self.request(method, path)?;
        if !options.headers.is_empty() {
            req = req.headers(options.headers.clone());
        }
        if let Some(timeout) = options.timeout {
            req = req.timeout(timeout);
        }
        Ok(req)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        self.request(Method::GET, path)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn post(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        self.request(Method::POST, path)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn put(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        self.request(Method::PUT, path)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn patch(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        self.request(Method::PATCH, path)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn delete(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        self.request(Method::DELETE, path)
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn head(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        self.request(Method::HEAD, path)
    }

    /// Send a request built from this client, rejecting non-2xx statuses.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on network failure or timeout and
    /// [`ApiError::Status`] on a non-2xx response.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let resp = request.send().await.inspect_err(|e| {
            if e.is_timeout() {
                tracing::warn!(base_url = %self.base_url, "API request timed out: {e}");
            } else {
                tracing::warn!(base_url = %self.base_url, "API request failed: {e}");
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(%status, "API request rejected");
            return Err(ApiError::Status { status, body });
        }
        Ok(resp)
    }

    /// # Errors
    ///
    /// Returns `ApiError` on network, status, or JSON decoding errors.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.get(path)?).await?;
        Ok(resp.json().await?)
    }

    /// # Errors
    ///
    /// Returns `ApiError` on network, status, or JSON decoding errors.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.post(path)?.json(body)).await?;
        Ok(resp.json().await?)
    }
}

fn is_absolute_url(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
