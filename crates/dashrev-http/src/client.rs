//! HTTP client bound to one dashboard server

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::{
    config::HttpConfig,
    error::{HttpError, Result},
    middleware::{RetryConfig, RetryMiddleware},
};

/// Production HTTP client
///
/// Paths are resolved against the configured base URL. GETs go through the
/// retry middleware; POSTs are sent once.
pub struct HttpClient {
    inner: reqwest::Client,
    config: HttpConfig,
    base: Url,
    retry: RetryMiddleware,
}

impl HttpClient {
    /// Create a new HTTP client with configuration
    pub fn new(config: HttpConfig) -> Result<Self> {
        let base = parse_base(&config.base_url)?;

        let inner = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpError::BuildError(e.to_string()))?;

        let retry = RetryMiddleware::new(RetryConfig {
            max_attempts: config.retry_count,
            initial_delay: config.retry_delay(),
            ..Default::default()
        });

        Ok(Self {
            inner,
            config,
            base,
            retry,
        })
    }

    /// Get configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Server root every path is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an API path against the base URL
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::InvalidUrl(format!("{path}: {e}")))
    }

    /// GET a path and return the body as text
    pub async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = self.url(path)?;
        debug!("HTTP GET: {}", url);
        self.retry
            .execute(|| {
                let request = self.inner.request(Method::GET, url.clone()).query(query);
                self.send(request)
            })
            .await
    }

    /// GET a path and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get_text(path, query).await?;
        decode(&body)
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!("HTTP POST: {}", url);
        let request = self.inner.request(Method::POST, url).json(body);
        let body = self.send(request).await?;
        decode(&body)
    }

    async fn send(&self, mut request: RequestBuilder) -> Result<String> {
        if let Some(token) = &self.config.api_key {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::HttpStatus {
                status,
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string()),
            });
        }

        response.text().await.map_err(|e| self.map_send_error(e))
    }

    fn map_send_error(&self, err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(self.config.timeout())
        } else {
            HttpError::RequestFailed(err)
        }
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let mut base = Url::parse(raw).map_err(|e| HttpError::InvalidUrl(format!("{raw}: {e}")))?;
    if base.cannot_be_a_base() {
        return Err(HttpError::InvalidUrl(format!("{raw}: not a base URL")));
    }
    // keep any sub-path when joining relative routes
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| HttpError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_with_defaults() {
        let client = HttpClient::new(HttpConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpClient::new(HttpConfig::default().with_base_url("not a url"));
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }

    #[test]
    fn test_sub_path_is_preserved() {
        let client =
            HttpClient::new(HttpConfig::default().with_base_url("http://example.com/grafana"))
                .unwrap();
        let url = client.url("api/dashboards/db/1/versions").unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.com/grafana/api/dashboards/db/1/versions"
        );
    }

    #[test]
    fn test_compare_range_survives_join() {
        let client = HttpClient::new(HttpConfig::default()).unwrap();
        let url = client
            .url("/api/dashboards/db/1/compare/4...6/basic")
            .unwrap();
        assert_eq!(url.path(), "/api/dashboards/db/1/compare/4...6/basic");
    }
}
