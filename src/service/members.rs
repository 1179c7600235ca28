//! Per-member views: legislative activity and campaign finances.

use crate::analysis::aggregator::select_latest_totals;
use crate::analysis::normalize::{fec_cycle, individual_percentage, is_grassroots, years_in_service};
use crate::cache::TtlCache;
use crate::config::{CongressConfig, FecConfig};
use crate::error::AppError;
use crate::models::{MemberFinances, MemberStats, TopContributor};
use crate::remote::congress::LegislationListResponse;
use crate::remote::{CongressApi, FecApi, FetchError};
use chrono::{Datelike, Utc};
use std::time::Duration;
use tracing::{debug, warn};

/// Individual contributors listed on a member's finance card.
const TOP_INDIVIDUAL_CONTRIBUTORS: u32 = 10;

pub struct MemberService {
    congress: CongressApi,
    fec: FecApi,
    stats_ttl: Duration,
    finances_ttl: Duration,
    grassroots_threshold_pct: f64,
    stats: TtlCache<String, MemberStats>,
    finances: TtlCache<String, Option<MemberFinances>>,
}

fn required_id(id: Option<&str>) -> Result<&str, AppError> {
    id.map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("missing id"))
}

impl MemberService {
    pub fn new(congress: CongressApi, fec: FecApi, congress_cfg: &CongressConfig, fec_cfg: &FecConfig) -> Self {
        Self {
            congress,
            fec,
            stats_ttl: congress_cfg.stats_ttl(),
            finances_ttl: fec_cfg.cache_ttl(),
            grassroots_threshold_pct: fec_cfg.grassroots_threshold_pct,
            stats: TtlCache::new(),
            finances: TtlCache::new(),
        }
    }

    /// Sponsored and cosponsored bill counts plus years in service.
    pub async fn member_stats(&self, id: Option<&str>) -> Result<MemberStats, AppError> {
        let id = required_id(id)?;
        if !self.congress.has_key() {
            return Err(AppError::NotConfigured(
                "Missing Congress.gov API key (CONGRESS_API_KEY)".to_string(),
            ));
        }

        let cache_key = format!("member-stats:{}", id);
        if let Some(stats) = self.stats.get_fresh(&cache_key, self.stats_ttl) {
            debug!("Member stats cache hit for {}", id);
            return Ok(stats);
        }

        let (detail, sponsored, cosponsored) = tokio::join!(
            self.congress.member_detail(id),
            self.congress.sponsored_legislation(id),
            self.congress.cosponsored_legislation(id),
        );

        let member = detail
            .map_err(|e| warn!("Member detail for {} failed: {}", id, e))
            .ok()
            .and_then(|d| d.member);
        let start_years: Vec<i32> = member
            .iter()
            .flat_map(|m| m.terms.iter())
            .filter_map(|t| t.start_year)
            .filter(|&y| y > 0)
            .collect();

        let count = |label: &str, result: Result<LegislationListResponse, FetchError>| match result {
            Ok(listing) => listing.count(),
            Err(e) => {
                warn!("{} legislation for {} failed: {}", label, id, e);
                0
            }
        };

        let now = Utc::now();
        let stats = MemberStats {
            committees: Vec::new(),
            bills_sponsored_count: count("Sponsored", sponsored),
            bills_cosponsored_count: count("Cosponsored", cosponsored),
            years_in_service: years_in_service(&start_years, now.year()),
            fetched_at: now.timestamp_millis(),
        };

        self.stats.insert(cache_key, stats.clone());
        Ok(stats)
    }

    /// FEC totals, principal committee, and top individual donors for a
    /// member; `None` when no FEC candidate matches. Only settled answers are
    /// cached, so a failed upstream hop is retried on the next request.
    pub async fn member_finances(&self, id: Option<&str>) -> Result<Option<MemberFinances>, AppError> {
        let id = required_id(id)?;

        let cache_key = format!("member-finances:{}", id);
        if let Some(finances) = self.finances.get_fresh(&cache_key, self.finances_ttl) {
            debug!("Member finances cache hit for {}", id);
            return Ok(finances);
        }

        match self.lookup_finances(id).await {
            Ok(finances) => {
                self.finances.insert(cache_key, finances.clone());
                Ok(finances)
            }
            Err(e) => {
                warn!("Finances for {} unavailable: {}", id, e);
                Ok(None)
            }
        }
    }

    /// Walks member, candidate search and totals; any of those failing is an
    /// error. Committee and donor lookups degrade to partial finances.
    async fn lookup_finances(&self, id: &str) -> Result<Option<MemberFinances>, FetchError> {
        let Some(member) = self.congress.member_detail(id).await?.member else {
            return Ok(None);
        };
        let Some(name) = member.search_name() else {
            return Ok(None);
        };

        let matches = self.fec.search_candidates(name, 1).await?;
        let Some(candidate_id) = matches.into_iter().find_map(|m| m.candidate_id) else {
            return Ok(None);
        };
        debug!("Matched {} to FEC candidate {}", id, candidate_id);

        let cycle = fec_cycle(Utc::now().year());
        let results = self.fec.candidate_totals(&candidate_id).await?;
        let Some(totals) = select_latest_totals(&results, cycle) else {
            return Ok(None);
        };

        let receipts = totals.receipts.unwrap_or(0.0);
        let individual = totals.individual_contributions.unwrap_or(0.0);
        let mut finances = MemberFinances {
            candidate_id: candidate_id.clone(),
            committee_id: None,
            election_year: totals.candidate_election_year,
            cash_on_hand: totals.cash_on_hand(),
            receipts,
            disbursements: totals.disbursements.unwrap_or(0.0),
            net_contributions: totals.net_contributions.unwrap_or(0.0),
            pac_contributions: totals.other_political_committee_contributions.unwrap_or(0.0),
            individual_contributions: individual,
            individual_percentage: individual_percentage(individual, receipts),
            is_grassroots: is_grassroots(individual, receipts, self.grassroots_threshold_pct),
            contributors: Vec::new(),
        };

        let committees = match self.fec.candidate_committees(&candidate_id).await {
            Ok(committees) => committees,
            Err(e) => {
                warn!("FEC committees for {} failed: {}", candidate_id, e);
                return Ok(Some(finances));
            }
        };
        let Some(committee_id) = committees
            .into_iter()
            .find(|c| c.designation.as_deref() == Some("P"))
            .and_then(|c| c.committee_id)
        else {
            return Ok(Some(finances));
        };

        match self
            .fec
            .top_individual_receipts(&committee_id, cycle, TOP_INDIVIDUAL_CONTRIBUTORS)
            .await
        {
            Ok(rows) => {
                finances.contributors = rows
                    .into_iter()
                    .map(|row| TopContributor {
                        contribution_receipt_amount: row.amount(),
                        contributor_name: row.contributor_name,
                        contributor_employer: row.contributor_employer,
                        contributor_occupation: row.contributor_occupation,
                    })
                    .collect();
            }
            Err(e) => warn!("Top contributors for {} failed: {}", committee_id, e),
        }
        finances.committee_id = Some(committee_id);

        Ok(Some(finances))
    }
}
