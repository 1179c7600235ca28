//! Shared HTTP client and the error type for upstream calls.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure talking to an upstream API.
///
/// Errors carry the request path only; query strings hold API keys and are
/// stripped before anything is rendered.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned {status} for {path}")]
    Status { status: StatusCode, path: String },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Upstream HTTP status, when the upstream answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin wrapper around one pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("transparency/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    /// GET `url` with `query` appended and decode the JSON body.
    ///
    /// `url` must not carry a query string of its own; it is used verbatim in
    /// error messages and logs.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let response = self
            .inner
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                path: url.to_string(),
                source: e.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                path: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|e| FetchError::Decode {
            path: url.to_string(),
            source: e.without_url(),
        })
    }
}

/// Percent-encode one path segment taken from a caller.
pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::Value;

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/thing")
            .match_query(mockito::Matcher::UrlEncoded("api_key".into(), "k".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        let body: Value = client
            .get_json(&format!("{}/thing", server.url()), &[("api_key", "k".to_string())])
            .await
            .unwrap();

        assert_eq!(body["ok"], Value::Bool(true));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported_without_query() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/missing")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        let err = client
            .get_json::<Value>(
                &format!("{}/missing", server.url()),
                &[("api_key", "secret".to_string())],
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("A000360"), "A000360");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
