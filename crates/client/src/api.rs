//! HTTP client for the Taskboard REST API.
//!
//! Every request is resolved against the configured base URL and carries the
//! stored session token as a bearer credential when one is present. There is
//! no retry, backoff or timeout policy; failures go straight to the caller.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::storage::TokenStore;

/// Whether a request carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credentials {
    Bearer,
    Anonymous,
}

/// REST API client.
///
/// Cheap to clone; clones share the HTTP connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("taskboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, config.api_url.clone(), tokens))
    }

    /// Create a client from an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: Url, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                tokens,
            }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The token store consulted on every request.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path)?;
        send_json(self.request(Method::GET, url, Credentials::Bearer)).await
    }

    /// `GET` a JSON resource with query parameters.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let mut url = self.url(path)?;
        url.query_pairs_mut().extend_pairs(query);
        send_json(self.request(Method::GET, url, Credentials::Bearer)).await
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        send_json(self.request(Method::POST, url, Credentials::Bearer).json(body)).await
    }

    /// `POST` without the session token, for login and registration.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        send_json(self.request(Method::POST, url, Credentials::Anonymous).json(body)).await
    }

    /// `PUT` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        send_json(self.request(Method::PUT, url, Credentials::Bearer).json(body)).await
    }

    /// `PATCH` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        send_json(self.request(Method::PATCH, url, Credentials::Bearer).json(body)).await
    }

    /// `PATCH` a JSON body, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn patch_no_content<B>(&self, path: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        send_no_content(self.request(Method::PATCH, url, Credentials::Bearer).json(body)).await
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// Returns the classified API or transport error.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url(path)?;
        send_no_content(self.request(Method::DELETE, url, Credentials::Bearer)).await
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Transport(format!("invalid request path `{path}`: {e}")))
    }

    fn request(&self, method: Method, url: Url, credentials: Credentials) -> RequestBuilder {
        debug!(%method, path = url.path(), "API request");
        let builder = self.inner.http.request(method, url);

        if credentials == Credentials::Anonymous {
            return builder;
        }

        match self.inner.tokens.load() {
            Ok(Some(token)) => builder.bearer_auth(token.expose_secret()),
            Ok(None) => builder,
            Err(e) => {
                warn!(error = %e, "Could not read session token, sending request without it");
                builder
            }
        }
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::from_status(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        ClientError::InvalidResponse(format!("failed to parse {status} response: {e}"))
    })
}

async fn send_no_content(request: RequestBuilder) -> Result<(), ClientError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() || status == StatusCode::NOT_MODIFIED {
        return Ok(());
    }

    let body = response.text().await?;
    Err(ClientError::from_status(status, &body))
}
