//! OpenFEC v1 adapter.

use super::client::{segment, FetchError, HttpClient};
use super::lenient::{opt_amount, opt_year};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FecPagination {
    #[serde(default)]
    pub pages: Option<u32>,
}

/// Standard OpenFEC envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct FecPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub pagination: Option<FecPagination>,
}

impl<T> FecPage<T> {
    pub fn total_pages(&self) -> u32 {
        self.pagination.as_ref().and_then(|p| p.pages).unwrap_or(0)
    }
}

/// One row of `/candidate/{id}/totals/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateTotals {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
    #[serde(default, deserialize_with = "opt_year")]
    pub candidate_election_year: Option<i32>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub receipts: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub disbursements: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub last_cash_on_hand_end_period: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub cash_on_hand_end_period: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub last_report_cash_on_hand: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub individual_contributions: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub other_political_committee_contributions: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub net_contributions: Option<f64>,
}

impl CandidateTotals {
    /// Cash on hand, preferring the latest end-of-period figure.
    pub fn cash_on_hand(&self) -> f64 {
        self.last_cash_on_hand_end_period
            .or(self.cash_on_hand_end_period)
            .or(self.last_report_cash_on_hand)
            .unwrap_or(0.0)
    }
}

/// One row of `/candidate/{id}/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateMatch {
    #[serde(default)]
    pub candidate_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitteeSummary {
    #[serde(default)]
    pub committee_id: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
}

/// One itemized receipt from Schedule A.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleARow {
    #[serde(default)]
    pub contributor_name: Option<String>,
    #[serde(default)]
    pub contributor_organization: Option<String>,
    #[serde(default)]
    pub contributor_employer: Option<String>,
    #[serde(default)]
    pub contributor_occupation: Option<String>,
    /// Contributing committee, present when the donor is itself a committee.
    #[serde(default)]
    pub contributor_id: Option<String>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub contribution_receipt_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub amount: Option<f64>,
}

impl ScheduleARow {
    pub fn amount(&self) -> f64 {
        self.contribution_receipt_amount
            .or(self.amount)
            .unwrap_or(0.0)
    }

    /// Best available label for who gave the money.
    pub fn contributor_label(&self) -> String {
        [
            &self.contributor_name,
            &self.contributor_organization,
            &self.contributor_employer,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or("Unknown")
        .to_string()
    }
}

/// OpenFEC endpoints used by the service.
#[derive(Debug, Clone)]
pub struct FecApi {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl FecApi {
    pub fn new(http: HttpClient, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Append the key only when one is configured; unauthenticated calls are
    /// allowed but rate-limited upstream.
    fn keyed<'a>(&self, mut query: Vec<(&'a str, String)>) -> Vec<(&'a str, String)> {
        if let Some(ref key) = self.api_key {
            query.push(("api_key", key.clone()));
        }
        query
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(&str, String)>,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        self.http.get_json(&url, &self.keyed(query)).await
    }

    pub async fn candidate_totals(&self, candidate_id: &str) -> Result<Vec<CandidateTotals>, FetchError> {
        let page: FecPage<CandidateTotals> = self
            .get(
                &format!("/candidate/{}/totals/", segment(candidate_id)),
                vec![("election_full", "true".to_string())],
            )
            .await?;
        Ok(page.results)
    }

    pub async fn candidate_detail(&self, candidate_id: &str) -> Result<Option<CandidateDetail>, FetchError> {
        let page: FecPage<CandidateDetail> = self
            .get(&format!("/candidate/{}/", segment(candidate_id)), vec![])
            .await?;
        Ok(page.results.into_iter().next())
    }

    pub async fn search_candidates(&self, q: &str, per_page: u32) -> Result<Vec<CandidateMatch>, FetchError> {
        let page: FecPage<CandidateMatch> = self
            .get(
                "/candidates/search/",
                vec![("q", q.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        Ok(page.results)
    }

    pub async fn candidate_committees(&self, candidate_id: &str) -> Result<Vec<CommitteeSummary>, FetchError> {
        let page: FecPage<CommitteeSummary> = self
            .get(&format!("/candidate/{}/committees/", segment(candidate_id)), vec![])
            .await?;
        Ok(page.results)
    }

    /// One page of Schedule A receipts linked to a candidate.
    pub async fn schedule_a_for_candidate(
        &self,
        candidate_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<FecPage<ScheduleARow>, FetchError> {
        self.get(
            "/schedules/schedule_a/",
            vec![
                ("candidate_id", candidate_id.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    /// Largest individual receipts of one committee in a two-year period.
    pub async fn top_individual_receipts(
        &self,
        committee_id: &str,
        cycle: i32,
        per_page: u32,
    ) -> Result<Vec<ScheduleARow>, FetchError> {
        let page: FecPage<ScheduleARow> = self
            .get(
                "/schedules/schedule_a/",
                vec![
                    ("committee_id", committee_id.to_string()),
                    ("sort", "-contribution_receipt_amount".to_string()),
                    ("per_page", per_page.to_string()),
                    ("two_year_transaction_period", cycle.to_string()),
                    ("contributor_type", "individual".to_string()),
                ],
            )
            .await?;
        Ok(page.results)
    }

    // Untyped pass-through calls for the proxy routes.

    pub async fn search_candidates_raw(&self, q: &str, per_page: &str) -> Result<Value, FetchError> {
        self.get(
            "/candidates/search/",
            vec![("q", q.to_string()), ("per_page", per_page.to_string())],
        )
        .await
    }

    pub async fn candidate_totals_raw(&self, candidate_id: &str) -> Result<Value, FetchError> {
        self.get(
            &format!("/candidate/{}/totals/", segment(candidate_id)),
            vec![("election_full", "true".to_string())],
        )
        .await
    }

    pub async fn candidate_committees_raw(&self, candidate_id: &str) -> Result<Value, FetchError> {
        self.get(&format!("/candidate/{}/committees/", segment(candidate_id)), vec![])
            .await
    }

    pub async fn committee_schedule_a_raw(
        &self,
        committee_id: &str,
        per_page: &str,
        two_year_period: Option<&str>,
    ) -> Result<Value, FetchError> {
        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(period) = two_year_period {
            query.push(("two_year_transaction_period", period.to_string()));
        }
        self.get(
            &format!("/committee/{}/schedules/schedule_a/", segment(committee_id)),
            query,
        )
        .await
    }

    /// `/schedules/{slug..}` with the caller's query forwarded.
    pub async fn schedules_raw(&self, slug: &[&str], query: &[(String, String)]) -> Result<Value, FetchError> {
        let path = slug.iter().map(|s| segment(s)).collect::<Vec<_>>().join("/");
        let forwarded = query
            .iter()
            .filter(|(k, _)| k != "api_key")
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        self.get(&format!("/schedules/{}", path), forwarded).await
    }
}
