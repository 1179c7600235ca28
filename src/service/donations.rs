//! Campaign finance dashboard: top candidates plus optional party-level
//! Schedule A aggregation.

use crate::analysis::aggregator::{merge_party_contributions, ContributionLedger};
use crate::cache::TtlCache;
use crate::config::FecConfig;
use crate::models::{
    CandidateContributions, DataSource, DonationTotals, DonationsMeta, DonationsReport,
    NamedAmount, PartyAggregate, TopCandidate,
};
use crate::remote::fec::CandidateDetail;
use crate::remote::{CandidateTotals, FecApi};
use futures::future::{join, join_all};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const UNKNOWN: &str = "UNK";

fn named(name: &str, amount: f64, count: u64) -> NamedAmount {
    NamedAmount {
        name: name.to_string(),
        amount,
        count,
    }
}

/// Contributor breakdown shown until itemized aggregates are available.
pub fn placeholder_contributors() -> Vec<NamedAmount> {
    vec![
        named("Various Individual Donors", 50_000_000.0, 10_000),
        named("PAC Contributions", 25_000_000.0, 500),
        named("Self-Funded Candidates", 20_000_000.0, 50),
    ]
}

pub fn placeholder_industries() -> Vec<NamedAmount> {
    vec![
        named("Technology", 15_000_000.0, 2000),
        named("Healthcare", 12_000_000.0, 1800),
        named("Finance", 10_000_000.0, 1500),
        named("Energy", 8_000_000.0, 1200),
        named("Defense", 7_000_000.0, 1000),
        named("Other", 8_000_000.0, 1100),
    ]
}

/// Candidates reported when the FEC returned nothing usable.
pub fn placeholder_candidates() -> Vec<TopCandidate> {
    vec![
        TopCandidate {
            name: "DONALD J. TRUMP".to_string(),
            receipts: 200_000_000.0,
            disbursements: 150_000_000.0,
            cash_on_hand: 50_000_000.0,
            party: "REP".to_string(),
            state: "FL".to_string(),
            office: "P".to_string(),
            candidate_id: "P80001571".to_string(),
        },
        TopCandidate {
            name: "JOSEPH R. BIDEN".to_string(),
            receipts: 150_000_000.0,
            disbursements: 120_000_000.0,
            cash_on_hand: 30_000_000.0,
            party: "DEM".to_string(),
            state: "DE".to_string(),
            office: "P".to_string(),
            candidate_id: "P80000722".to_string(),
        },
    ]
}

/// Merge totals and candidate detail; `None` when neither was found.
fn top_candidate(
    candidate_id: &str,
    totals: Option<CandidateTotals>,
    detail: Option<CandidateDetail>,
) -> Option<TopCandidate> {
    if totals.is_none() && detail.is_none() {
        return None;
    }
    let totals = totals.unwrap_or_default();
    let detail = detail.unwrap_or_default();

    let pick = |a: Option<String>, b: Option<String>| {
        a.filter(|s| !s.is_empty())
            .or(b.filter(|s| !s.is_empty()))
    };

    Some(TopCandidate {
        cash_on_hand: totals.cash_on_hand(),
        receipts: totals.receipts.unwrap_or(0.0),
        disbursements: totals.disbursements.unwrap_or(0.0),
        name: pick(detail.name, totals.name).unwrap_or_else(|| candidate_id.to_string()),
        party: pick(detail.party, totals.party).unwrap_or_else(|| UNKNOWN.to_string()),
        state: pick(detail.state, totals.state).unwrap_or_else(|| UNKNOWN.to_string()),
        office: pick(detail.office, totals.office).unwrap_or_else(|| UNKNOWN.to_string()),
        candidate_id: candidate_id.to_string(),
    })
}

fn donation_totals(candidates: &[TopCandidate], contributors: &[NamedAmount]) -> DonationTotals {
    let total_raised: f64 = candidates.iter().map(|c| c.receipts).sum();
    let unique_donors: u64 = contributors.iter().map(|c| c.count).sum();

    DonationTotals {
        total_raised,
        total_spent: candidates.iter().map(|c| c.disbursements).sum(),
        unique_donors,
        avg_donation: total_raised / unique_donors.max(1) as f64,
    }
}

pub struct DonationsService {
    api: FecApi,
    settings: FecConfig,
    candidate_contributions: TtlCache<String, CandidateContributions>,
    party_aggregates: TtlCache<String, PartyAggregate>,
}

impl DonationsService {
    pub fn new(api: FecApi, settings: FecConfig) -> Self {
        if !api.has_key() {
            warn!("FEC_API_KEY is not set; FEC requests are unauthenticated and may be rate-limited");
        }

        Self {
            api,
            settings,
            candidate_contributions: TtlCache::new(),
            party_aggregates: TtlCache::new(),
        }
    }

    /// Build the donations dashboard; `party` aggregates are only computed
    /// when `detail` is set.
    pub async fn donations(&self, party: Option<&str>, detail: bool) -> DonationsReport {
        let mut candidates = self.top_candidates().await;
        let source = if candidates.is_empty() {
            warn!("No FEC candidate data available; using placeholder candidates");
            candidates = placeholder_candidates();
            DataSource::Mock
        } else {
            DataSource::Fec
        };

        let party_aggregate = match party.map(str::trim).filter(|p| !p.is_empty()) {
            Some(party) if detail => {
                let key = party.to_uppercase();
                let aggregate = self.party_aggregate(&key, &candidates).await;
                Some((key, aggregate))
            }
            _ => None,
        };

        let top_contributors = placeholder_contributors();
        let totals = donation_totals(&candidates, &top_contributors);
        let candidate_count = candidates.len();

        let (top_industries_by_party, donor_type_shares) = match party_aggregate {
            Some((key, aggregate)) => (
                Some(HashMap::from([(key, aggregate.top_companies)])),
                Some(aggregate.donor_type_shares),
            ),
            None => (None, None),
        };

        DonationsReport {
            top_contributors,
            top_industries: placeholder_industries(),
            top_candidates: candidates,
            meta: DonationsMeta {
                source,
                candidate_count,
                had_party_aggregates: top_industries_by_party.is_some(),
            },
            top_industries_by_party,
            donor_type_shares,
            totals,
        }
    }

    async fn top_candidates(&self) -> Vec<TopCandidate> {
        let lookups = self.settings.candidate_ids.iter().map(|id| async move {
            let (totals, detail) = join(self.api.candidate_totals(id), self.api.candidate_detail(id)).await;

            let totals = totals
                .map_err(|e| warn!("FEC totals for {} failed: {}", id, e))
                .ok()
                .and_then(|results| results.into_iter().next());
            let detail = detail
                .map_err(|e| warn!("FEC candidate {} failed: {}", id, e))
                .ok()
                .flatten();

            top_candidate(id, totals, detail)
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    /// Contributions merged across the party's candidates, cached per key.
    async fn party_aggregate(&self, key: &str, candidates: &[TopCandidate]) -> PartyAggregate {
        if let Some(aggregate) = self
            .party_aggregates
            .get_fresh(&key.to_string(), self.settings.cache_ttl())
        {
            debug!("Party aggregate cache hit for {}", key);
            return aggregate;
        }

        let members: Vec<&TopCandidate> = candidates
            .iter()
            .filter(|c| c.party.to_uppercase().contains(key))
            .collect();
        info!("Aggregating Schedule A for {} {} candidates", members.len(), key);

        let mut per_candidate = Vec::with_capacity(members.len());
        for candidate in members {
            per_candidate.push(self.candidate_contributions(&candidate.candidate_id).await);
            tokio::time::sleep(Duration::from_millis(self.settings.candidate_delay_ms)).await;
        }

        let aggregate = merge_party_contributions(&per_candidate);
        self.party_aggregates.insert(key.to_string(), aggregate.clone());
        aggregate
    }

    /// Schedule A receipts of one candidate grouped by contributor.
    ///
    /// Reads at most `schedule_a_max_pages` pages; a failed page ends the walk
    /// and the partial result is still cached.
    pub async fn candidate_contributions(&self, candidate_id: &str) -> CandidateContributions {
        let cache_key = candidate_id.to_string();
        if let Some(cached) = self
            .candidate_contributions
            .get_fresh(&cache_key, self.settings.cache_ttl())
        {
            return cached;
        }

        let mut ledger = ContributionLedger::new();
        let mut page = 1;

        while page <= self.settings.schedule_a_max_pages {
            let result = self
                .api
                .schedule_a_for_candidate(candidate_id, page, self.settings.schedule_a_per_page)
                .await;

            let listing = match result {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("Schedule A for {} stopped at page {}: {}", candidate_id, page, e);
                    break;
                }
            };

            for row in &listing.results {
                ledger.add(row);
            }

            let more = page < listing.total_pages();
            page += 1;
            tokio::time::sleep(Duration::from_millis(self.settings.page_delay_ms)).await;
            if !more {
                break;
            }
        }

        let contributions = ledger.finish();
        self.candidate_contributions
            .insert(cache_key, contributions.clone());
        contributions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::HttpClient;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn settings(ids: &[&str]) -> FecConfig {
        FecConfig {
            candidate_ids: ids.iter().map(|s| s.to_string()).collect(),
            page_delay_ms: 0,
            candidate_delay_ms: 0,
            ..Default::default()
        }
    }

    fn service(server: &ServerGuard, settings: FecConfig) -> DonationsService {
        let http = HttpClient::new(Duration::from_secs(5)).unwrap();
        DonationsService::new(FecApi::new(http, &server.url(), Some("k".to_string())), settings)
    }

    #[test]
    fn test_donation_totals_from_placeholders() {
        let totals = donation_totals(&placeholder_candidates(), &placeholder_contributors());
        assert_eq!(totals.total_raised, 350_000_000.0);
        assert_eq!(totals.total_spent, 270_000_000.0);
        assert_eq!(totals.unique_donors, 10_550);
        assert!((totals.avg_donation - 350_000_000.0 / 10_550.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_candidate_field_fallbacks() {
        assert!(top_candidate("X", None, None).is_none());

        let detail = CandidateDetail {
            name: Some("SANDERS, BERNARD".to_string()),
            ..Default::default()
        };
        let candidate = top_candidate("S4VT00033", None, Some(detail)).unwrap();
        assert_eq!(candidate.name, "SANDERS, BERNARD");
        assert_eq!(candidate.party, "UNK");
        assert_eq!(candidate.receipts, 0.0);

        let totals = CandidateTotals {
            party: Some("DEM".to_string()),
            receipts: Some(10.0),
            ..Default::default()
        };
        let candidate = top_candidate("H8CA05035", Some(totals), None).unwrap();
        assert_eq!(candidate.name, "H8CA05035");
        assert_eq!(candidate.party, "DEM");
    }

    #[tokio::test]
    async fn test_falls_back_to_placeholders() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex(r"^/candidate/".into()))
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let report = service(&server, settings(&["P80001571", "S4VT00033"]))
            .donations(None, false)
            .await;

        assert_eq!(report.meta.source, DataSource::Mock);
        assert_eq!(report.meta.candidate_count, 2);
        assert!(!report.meta.had_party_aggregates);
        assert_eq!(report.top_candidates[1].name, "JOSEPH R. BIDEN");
        assert!(report.top_industries_by_party.is_none());
    }

    #[tokio::test]
    async fn test_real_candidates_and_party_detail() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/candidate/S4VT00033/totals/")
            .match_query(Matcher::UrlEncoded("election_full".into(), "true".into()))
            .with_status(200)
            .with_body(
                r#"{"results": [{"receipts": 1000, "disbursements": 400,
                    "cash_on_hand_end_period": 600}]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/candidate/S4VT00033/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results": [{"name": "SANDERS, BERNARD", "party": "IND", "state": "VT", "office": "S"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/candidate/H8CA05035/totals/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results": [{"receipts": 500, "party": "DEM"}]}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/candidate/H8CA05035/")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        let page_one = server
            .mock("GET", "/schedules/schedule_a/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("candidate_id".into(), "H8CA05035".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"results": [
                    {"contributor_name": "Builders PAC", "contributor_id": "C00999999",
                     "committee_id": "C00213611", "contribution_receipt_amount": 5000},
                    {"contributor_name": "DOE, JANE", "committee_id": "C00213611",
                     "contribution_receipt_amount": 250}
                ], "pagination": {"pages": 2}}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let page_two = server
            .mock("GET", "/schedules/schedule_a/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("candidate_id".into(), "H8CA05035".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"results": [{"contributor_name": "DOE, JANE", "amount": "100"}],
                    "pagination": {"pages": 2}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let service = service(&server, settings(&["S4VT00033", "H8CA05035"]));
        let report = service.donations(Some("dem"), true).await;

        assert_eq!(report.meta.source, DataSource::Fec);
        assert_eq!(report.meta.candidate_count, 2);
        assert!(report.meta.had_party_aggregates);
        assert_eq!(report.top_candidates[0].cash_on_hand, 600.0);
        assert_eq!(report.totals.total_raised, 1500.0);

        let companies = &report.top_industries_by_party.as_ref().unwrap()["DEM"];
        assert_eq!(companies[0].name, "Builders PAC");
        assert_eq!(companies[1].amount, 350.0);

        let shares = report.donor_type_shares.unwrap();
        assert_eq!(shares.pac_total, 5000.0);
        assert_eq!(shares.individual_total, 350.0);
        assert_eq!(shares.party_total, 5350.0);

        // Second request is served from the party cache.
        let again = service.donations(Some("DEM"), true).await;
        let value = serde_json::to_value(&again).unwrap();
        assert_eq!(value["topIndustriesByParty"]["DEM"][0]["amount"], json!(5000.0));
        page_one.assert_async().await;
        page_two.assert_async().await;
    }

    #[tokio::test]
    async fn test_party_without_detail_is_ignored() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Regex(r"^/candidate/".into()))
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let report = service(&server, settings(&["P80001571"]))
            .donations(Some("REP"), false)
            .await;
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["topIndustriesByParty"], json!(null));
        assert!(value.get("donorTypeShares").is_none());
    }
}
