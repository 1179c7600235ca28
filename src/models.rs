//! View models served by the API.
//!
//! Everything here is derived from upstream responses on a cache miss and
//! never persisted. Field names follow the JSON the dashboard already
//! consumes, which is why some structs are camelCase and the FEC-shaped ones
//! keep snake_case.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Normalized party label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Party {
    Republican,
    Democrat,
    Independent,
    /// Upstream text that matched none of the known parties.
    Other(String),
    Unknown,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Republican => write!(f, "Republican"),
            Party::Democrat => write!(f, "Democrat"),
            Party::Independent => write!(f, "Independent"),
            Party::Other(s) => write!(f, "{}", s),
            Party::Unknown => write!(f, "Unknown"),
        }
    }
}

impl Serialize for Party {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which party holds a state's senate delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Control {
    Republican,
    Democrat,
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    House,
    Senate,
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chamber::House => write!(f, "house"),
            Chamber::Senate => write!(f, "senate"),
        }
    }
}

/// Seat counts for one chamber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChamberTally {
    pub republicans: u32,
    pub democrats: u32,
    pub independents: u32,
    pub vacant: u32,
}

impl ChamberTally {
    pub fn filled(&self) -> u32 {
        self.republicans + self.democrats + self.independents
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SenatorSummary {
    pub name: String,
    pub party: Party,
    pub bioguide_id: Option<String>,
    pub depiction: Option<String>,
    pub start_year: Option<i32>,
    pub office_phone: Option<String>,
    pub contact_form: Option<String>,
}

/// Senate delegation of one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSenate {
    pub name: String,
    pub senators: Vec<SenatorSummary>,
    pub control: Control,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Representative {
    pub name: String,
    pub party: Party,
    pub bioguide_id: Option<String>,
    pub district: String,
    pub depiction: Option<String>,
    pub start_year: Option<i32>,
    pub office_phone: Option<String>,
    pub contact_form: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateHouse {
    pub name: String,
    pub representatives: Vec<Representative>,
}

/// State code → senate delegation.
pub type SenateMap = BTreeMap<String, StateSenate>;

/// State code → house delegation.
pub type HouseByState = BTreeMap<String, StateHouse>;

/// One row of the flattened member directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatMember {
    pub id: String,
    pub name: String,
    pub party: Party,
    pub state: String,
    pub state_code: String,
    pub district: Option<String>,
    pub chamber: Chamber,
    pub portrait_url: Option<String>,
    pub years_in_service: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberPage {
    pub total: usize,
    pub items: Vec<FlatMember>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCongress {
    pub senate: Option<Arc<SenateMap>>,
    pub house: Option<ChamberTally>,
    pub house_by_state: Option<Arc<HouseByState>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CongressOverview {
    pub senate: Option<Arc<SenateMap>>,
    pub house: Option<ChamberTally>,
}

/// Legislative activity for one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    /// Congress.gov exposes no committee membership; always empty.
    pub committees: Vec<String>,
    pub bills_sponsored_count: u64,
    pub bills_cosponsored_count: u64,
    pub years_in_service: i32,
    /// Milliseconds since the Unix epoch.
    pub fetched_at: i64,
}

/// A large individual receipt for a member's principal committee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopContributor {
    pub contributor_name: Option<String>,
    pub contribution_receipt_amount: f64,
    pub contributor_employer: Option<String>,
    pub contributor_occupation: Option<String>,
}

/// Campaign finance picture for one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFinances {
    pub candidate_id: String,
    pub committee_id: Option<String>,
    pub election_year: Option<i32>,
    pub cash_on_hand: f64,
    pub receipts: f64,
    pub disbursements: f64,
    pub net_contributions: f64,
    pub pac_contributions: f64,
    pub individual_contributions: f64,
    pub individual_percentage: f64,
    pub is_grassroots: bool,
    pub contributors: Vec<TopContributor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCandidate {
    pub name: String,
    pub receipts: f64,
    pub disbursements: f64,
    pub cash_on_hand: f64,
    pub party: String,
    pub state: String,
    pub office: String,
    pub candidate_id: String,
}

/// Labelled amount with a donor count (placeholder breakdowns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedAmount {
    pub name: String,
    pub amount: f64,
    pub count: u64,
}

/// Summed receipts from one contributor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorTotal {
    pub name: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee_id: Option<String>,
}

/// Schedule A receipts of one candidate, grouped by contributor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateContributions {
    pub total: f64,
    pub top_contributors: Vec<ContributorTotal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorTypeShares {
    pub pac_total: f64,
    pub individual_total: f64,
    pub party_total: f64,
}

/// Contributions merged across all candidates of one party.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyAggregate {
    pub top_companies: Vec<ContributorTotal>,
    pub donor_type_shares: DonorTypeShares,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationTotals {
    pub total_raised: f64,
    pub total_spent: f64,
    pub unique_donors: u64,
    pub avg_donation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Fec,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationsMeta {
    pub source: DataSource,
    pub candidate_count: usize,
    pub had_party_aggregates: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationsReport {
    pub top_contributors: Vec<NamedAmount>,
    pub top_industries: Vec<NamedAmount>,
    pub top_candidates: Vec<TopCandidate>,
    pub top_industries_by_party: Option<HashMap<String, Vec<ContributorTotal>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_type_shares: Option<DonorTypeShares>,
    pub totals: DonationTotals,
    pub meta: DonationsMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct Executive {
    pub name: String,
    pub title: String,
    pub party: String,
    pub image_url: String,
    pub start_date: String,
    pub twitter_account: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhiteHouse {
    pub president: Executive,
    pub vice_president: Executive,
}

#[derive(Debug, Clone, Serialize)]
pub struct District {
    pub district: String,
    pub representative: Representative,
}

/// Everything known about one state's delegation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDetail {
    pub state: String,
    pub state_name: String,
    pub districts: Vec<District>,
    pub senators: Vec<SenatorSummary>,
}
