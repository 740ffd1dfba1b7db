//! # Fetch Module
//!
//! The `fetch` passthrough handed to preload functions through their
//! [`PreloadContext`](crate::navigation::PreloadContext). [`Fetcher`] is the
//! seam: the navigator defaults to [`ReqwestFetcher`], tests plug in a canned
//! implementation.
//!
//! Relative URLs are resolved against the base URL, so a preload can call
//! `ctx.fetch("blog/hello.json", ...)` the same way on every page.

use std::collections::BTreeMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::navigation::NavigationError;

/// Request options of a preload `fetch`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// HTTP method, `GET` when unset
    pub method: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// Buffered response of a preload `fetch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Final URL of the request
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FetchResponse {
    /// True for a 2xx status
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response body as text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NavigationError> {
        serde_json::from_str(&self.body).map_err(|e| NavigationError::Fetch {
            url: self.url.clone(),
            message: format!("invalid JSON body: {e}"),
        })
    }
}

/// Performs the network requests preloads issue
pub trait Fetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> BoxFuture<'static, Result<FetchResponse, NavigationError>>;
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestFetcher {
    /// Fetcher resolving relative URLs against `base`
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    /// Fetcher using a preconfigured client
    #[must_use]
    pub fn with_client(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> BoxFuture<'static, Result<FetchResponse, NavigationError>> {
        let client = self.client.clone();
        let resolved = self.base.join(url);
        let raw = url.to_string();

        async move {
            let fetch_error = |url: &str, message: String| NavigationError::Fetch {
                url: url.to_string(),
                message,
            };

            let url = resolved.map_err(|e| fetch_error(&raw, e.to_string()))?;
            let method = options.method.as_deref().unwrap_or("GET");
            let method = reqwest::Method::from_bytes(method.as_bytes())
                .map_err(|e| fetch_error(url.as_str(), e.to_string()))?;

            debug!(url = %url, method = %method, "Preload fetch");

            let mut request = client.request(method, url.clone());
            for (name, value) in &options.headers {
                request = request.header(name.as_str(), value.as_str());
            }
            if let Some(body) = options.body {
                request = request.body(body);
            }

            let response = request.send().await.map_err(|e| {
                warn!(url = %url, error = %e, "Preload fetch failed");
                fetch_error(url.as_str(), e.to_string())
            })?;

            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .text()
                .await
                .map_err(|e| fetch_error(&final_url, e.to_string()))?;

            Ok(FetchResponse {
                url: final_url,
                status,
                headers,
                body,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> FetchResponse {
        FetchResponse {
            url: "http://localhost:3000/blog.json".to_string(),
            status,
            headers: BTreeMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_response_ok_range() {
        assert!(response(200, "").ok());
        assert!(response(204, "").ok());
        assert!(!response(301, "").ok());
        assert!(!response(404, "").ok());
    }

    #[test]
    fn test_response_json() {
        let value: serde_json::Value = response(200, r#"{"title":"Hello"}"#).json().unwrap();
        assert_eq!(value["title"], "Hello");

        let err = response(200, "<html>").json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, NavigationError::Fetch { ref url, .. } if url.ends_with("blog.json")));
    }

    #[tokio::test]
    async fn test_invalid_method_is_a_fetch_error() {
        let fetcher = ReqwestFetcher::new(Url::parse("http://localhost:3000/").unwrap());
        let options = FetchOptions {
            method: Some("BAD METHOD".to_string()),
            ..FetchOptions::default()
        };
        let err = fetcher.fetch("blog.json", options).await.unwrap_err();
        assert!(
            matches!(err, NavigationError::Fetch { ref url, .. } if url == "http://localhost:3000/blog.json")
        );
    }
}
