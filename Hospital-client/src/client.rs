use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Per-request settings merged into every call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    /// Serialized JSON body
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    pub fn put() -> Self {
        Self::method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

#[derive(Deserialize)]
struct MessageOnly {
    message: Option<String>,
}

/// HTTP client for the hospital API; clones share the connection pool and token store
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.tokens.get().is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, tokens)
    }

    /// Reuse an existing [`reqwest::Client`]
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            tokens,
        }
    }

    /// File-backed token store when a path is configured, memory otherwise
    pub fn from_config(config: &ClientConfig) -> Self {
        let tokens: Arc<dyn TokenStore> = match &config.token_path {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::new(config.base_url.clone(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Send a JSON request to `{base_url}{endpoint}` and decode a 2xx body as `T`
    ///
    /// Caller headers are kept, except that `Content-Type` is always
    /// `application/json` and `Authorization` is replaced by the stored
    /// bearer token when one exists. A stored token that is not a valid header
    /// value fails with [`ClientError::InvalidToken`] before anything is sent.
    /// An empty or whitespace-only 2xx body decodes as JSON `null`.
    pub async fn fetch_api<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut headers = options.headers;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.get() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                warn!("Stored token is not a valid header value, not sending request");
                ClientError::InvalidToken
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        debug!("{} {}", options.method, url);
        let mut request = self.http.request(options.method, &url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = Self::ensure_success(request.send().await?).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Turn a non-2xx response into [`ClientError::Status`]
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageOnly>(&body)
            .ok()
            .and_then(|m| m.message);
        warn!("API returned {}: {}", status, message.as_deref().unwrap_or(&body));

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
            body,
        })
    }
}
