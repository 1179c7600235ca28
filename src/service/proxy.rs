//! Pass-through endpoints that forward to Congress.gov and OpenFEC with a
//! short response cache.

use crate::cache::TtlCache;
use crate::error::AppError;
use crate::remote::{CongressApi, FecApi, FetchError};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct ProxyService {
    congress: CongressApi,
    fec: FecApi,
    ttl: Duration,
    cache: TtlCache<String, Value>,
}

impl ProxyService {
    pub fn new(congress: CongressApi, fec: FecApi, ttl: Duration) -> Self {
        Self {
            congress,
            fec,
            ttl,
            cache: TtlCache::new(),
        }
    }

    /// Serve `key` from cache or run `fetch`, translating upstream failures.
    async fn cached<F, Fut>(&self, key: String, failure: &str, fetch: F) -> Result<Value, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        if let Some(value) = self.cache.get_fresh(&key, self.ttl) {
            debug!("Proxy cache hit for {}", key);
            return Ok(value);
        }

        match fetch().await {
            Ok(value) => {
                self.cache.insert(key, value.clone());
                Ok(value)
            }
            Err(e) => match e.status() {
                Some(status) => {
                    warn!("{}: {}", failure, e);
                    Err(AppError::Upstream {
                        status,
                        message: failure.to_string(),
                    })
                }
                None => {
                    error!("{}: {}", failure, e);
                    Err(AppError::Internal("Internal server error".to_string()))
                }
            },
        }
    }

    pub async fn congress_member(&self, id: &str) -> Result<Value, AppError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::bad_request("Member ID required"));
        }

        self.cached(format!("congress:member:{}", id), "Failed to fetch member data", || {
            self.congress.member_detail_raw(id)
        })
        .await
    }

    pub async fn candidate_search(&self, q: Option<&str>, per_page: Option<&str>) -> Result<Value, AppError> {
        let q = q
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::bad_request("Query parameter required"))?;
        let per_page = per_page.filter(|s| !s.is_empty()).unwrap_or("1");

        self.cached(format!("fec:search:{}:{}", q, per_page), "Failed to fetch candidates", || {
            self.fec.search_candidates_raw(q, per_page)
        })
        .await
    }

    pub async fn candidate_totals(&self, candidate_id: &str) -> Result<Value, AppError> {
        self.cached(
            format!("fec:totals:{}", candidate_id),
            "Failed to fetch candidate totals",
            || self.fec.candidate_totals_raw(candidate_id),
        )
        .await
    }

    pub async fn candidate_committees(&self, candidate_id: &str) -> Result<Value, AppError> {
        self.cached(
            format!("fec:committees:{}", candidate_id),
            "Failed to fetch candidate committees",
            || self.fec.candidate_committees_raw(candidate_id),
        )
        .await
    }

    pub async fn committee_schedule_a(
        &self,
        committee_id: &str,
        per_page: Option<&str>,
        two_year_period: Option<&str>,
    ) -> Result<Value, AppError> {
        let per_page = per_page.filter(|s| !s.is_empty()).unwrap_or("10");
        let period = two_year_period.filter(|s| !s.is_empty());

        self.cached(
            format!(
                "fec:schedule_a:{}:{}:{}",
                committee_id,
                per_page,
                period.unwrap_or("")
            ),
            "Failed to fetch schedule A data",
            || self.fec.committee_schedule_a_raw(committee_id, per_page, period),
        )
        .await
    }

    /// Forward `schedules/{slug}` with the caller's query string.
    pub async fn schedules(&self, slug: &str, query: &[(String, String)]) -> Result<Value, AppError> {
        let parts: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
        if parts.is_empty() {
            return Err(AppError::bad_request("Schedule path required"));
        }

        let mut sorted: Vec<String> = query
            .iter()
            .filter(|(k, _)| k != "api_key")
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        sorted.sort();

        self.cached(
            format!("fec:schedules:{}?{}", parts.join("/"), sorted.join("&")),
            "Failed to fetch schedules data",
            || self.fec.schedules_raw(&parts, query),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::HttpClient;
    use mockito::{Matcher, Server, ServerGuard};
    use reqwest::StatusCode;
    use serde_json::json;

    fn service(server: &ServerGuard, ttl: Duration) -> ProxyService {
        let http = HttpClient::new(Duration::from_secs(5)).unwrap();
        ProxyService::new(
            CongressApi::new(http.clone(), &server.url(), Some("ck".to_string())),
            FecApi::new(http, &server.url(), Some("fk".to_string())),
            ttl,
        )
    }

    /// Service pointed at a closed port.
    fn offline() -> ProxyService {
        let http = HttpClient::new(Duration::from_secs(1)).unwrap();
        ProxyService::new(
            CongressApi::new(http.clone(), "http://127.0.0.1:9", None),
            FecApi::new(http, "http://127.0.0.1:9", None),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_member_proxy_is_cached() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/member/S000033")
            .match_query(Matcher::UrlEncoded("api_key".into(), "ck".into()))
            .with_status(200)
            .with_body(r#"{"member": {"bioguideId": "S000033"}}"#)
            .expect(1)
            .create_async()
            .await;

        let proxy = service(&server, Duration::from_secs(60));
        for _ in 0..2 {
            let value = proxy.congress_member("S000033").await.unwrap();
            assert_eq!(value["member"]["bioguideId"], json!("S000033"));
        }
        mock.assert_async().await;
    }

    #[test]
    fn test_blank_member_id_is_rejected_before_fetch() {
        let proxy = offline();

        let err = tokio_test::block_on(proxy.congress_member("  ")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Member ID required");
    }

    #[tokio::test]
    async fn test_upstream_status_passes_through() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/candidate/P00000000/totals/")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = service(&server, Duration::from_secs(60))
            .candidate_totals("P00000000")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Failed to fetch candidate totals");
    }

    #[tokio::test]
    async fn test_search_requires_query_and_defaults_page_size() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/candidates/search/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "warren".into()),
                Matcher::UrlEncoded("per_page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let proxy = service(&server, Duration::from_secs(60));
        let err = proxy.candidate_search(None, None).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        proxy.candidate_search(Some("warren"), None).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_schedule_a_and_generic_schedules() {
        let mut server = Server::new_async().await;
        let committee = server
            .mock("GET", "/committee/C00411330/schedules/schedule_a/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("per_page".into(), "10".into()),
                Matcher::UrlEncoded("two_year_transaction_period".into(), "2024".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": [{"contribution_receipt_amount": 1}]}"#)
            .create_async()
            .await;
        let schedules = server
            .mock("GET", "/schedules/schedule_b/by_purpose")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cycle".into(), "2024".into()),
                Matcher::UrlEncoded("api_key".into(), "fk".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let proxy = service(&server, Duration::ZERO);
        let value = proxy
            .committee_schedule_a("C00411330", None, Some("2024"))
            .await
            .unwrap();
        assert_eq!(value["results"][0]["contribution_receipt_amount"], json!(1));

        let query = vec![
            ("cycle".to_string(), "2024".to_string()),
            ("api_key".to_string(), "caller".to_string()),
        ];
        proxy.schedules("schedule_b/by_purpose/", &query).await.unwrap();

        let err = proxy.schedules("", &[]).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        committee.assert_async().await;
        schedules.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure_is_internal() {
        let proxy = offline();

        let err = proxy.candidate_committees("S4VT00033").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
