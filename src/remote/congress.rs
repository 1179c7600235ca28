//! Congress.gov v3 adapter.

use super::client::{segment, FetchError, HttpClient};
use super::lenient::{opt_district, opt_year, OneOrMany};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Key used by the listing routes when no key is configured.
pub const DEMO_KEY: &str = "DEMO_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInformation {
    #[serde(default)]
    pub phone: Option<String>,
}

/// One service term as returned by the member endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTerm {
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default, deserialize_with = "opt_year")]
    pub start_year: Option<i32>,
    #[serde(default, deserialize_with = "opt_year")]
    pub end_year: Option<i32>,
    #[serde(default, deserialize_with = "opt_district")]
    pub district: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_information: Option<ContactInformation>,
}

impl RawTerm {
    pub fn chamber(&self) -> &str {
        self.chamber.as_deref().unwrap_or("")
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
            .or_else(|| non_blank(self.contact_information.as_ref()?.phone.as_deref()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Depiction {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartyHistoryEntry {
    #[serde(default, deserialize_with = "opt_district")]
    pub district: Option<String>,
}

/// A member record from either the listing or the detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMember {
    #[serde(default)]
    pub bioguide_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub direct_order_name: Option<String>,
    #[serde(default)]
    pub inverted_order_name: Option<String>,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "opt_district")]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "party_history_list")]
    pub party_history: OneOrMany<PartyHistoryEntry>,
    #[serde(default)]
    pub depiction: Option<Depiction>,
    #[serde(default, deserialize_with = "terms_list")]
    pub terms: Vec<RawTerm>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_information: Option<ContactInformation>,
}

impl RawMember {
    pub fn latest_term(&self) -> Option<&RawTerm> {
        self.terms.last()
    }

    /// Name used on cards: direct order, then the raw listing name.
    pub fn display_name(&self) -> String {
        non_blank(self.direct_order_name.as_deref())
            .or_else(|| non_blank(self.name.as_deref()))
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Name used when searching other datasets for this member.
    pub fn search_name(&self) -> Option<&str> {
        non_blank(self.direct_order_name.as_deref())
            .or_else(|| non_blank(self.inverted_order_name.as_deref()))
    }

    /// District of `term`, then of the member record, then of the first
    /// party-history entry.
    pub fn district_for(&self, term: &RawTerm) -> Option<String> {
        term.district
            .clone()
            .or_else(|| self.district.clone())
            .or_else(|| self.party_history.first()?.district.clone())
    }

    pub fn image_url(&self) -> Option<String> {
        self.depiction.as_ref()?.image_url.clone()
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
            .or_else(|| non_blank(self.contact_information.as_ref()?.phone.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// `terms` is `{"item": [...]}` or `{"item": {...}}` on listings and a bare
/// array on member detail.
#[derive(Deserialize)]
#[serde(untagged)]
enum TermsField {
    List(Vec<RawTerm>),
    Wrapped {
        #[serde(default)]
        item: OneOrMany<RawTerm>,
    },
}

fn terms_list<'de, D>(deserializer: D) -> Result<Vec<RawTerm>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TermsField>::deserialize(deserializer)? {
        Some(TermsField::List(terms)) => terms,
        Some(TermsField::Wrapped { item }) => item.into_vec(),
        None => Vec::new(),
    })
}

fn party_history_list<'de, D>(deserializer: D) -> Result<OneOrMany<PartyHistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany<PartyHistoryEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberListResponse {
    #[serde(default)]
    pub members: Vec<RawMember>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberDetailResponse {
    #[serde(default)]
    pub member: Option<RawMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NumResults {
    #[serde(default)]
    num_results: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegislationListResponse {
    #[serde(default)]
    pagination: Option<Pagination>,
    #[serde(default)]
    results: Vec<NumResults>,
}

impl LegislationListResponse {
    /// Total bills in the listing, 0 when the upstream omits it.
    pub fn count(&self) -> u64 {
        self.pagination
            .as_ref()
            .and_then(|p| p.count)
            .or_else(|| self.results.first().and_then(|r| r.num_results))
            .unwrap_or(0)
    }
}

/// Congress.gov endpoints used by the service.
#[derive(Debug, Clone)]
pub struct CongressApi {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl CongressApi {
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

    fn key(&self) -> String {
        self.api_key.clone().unwrap_or_else(|| DEMO_KEY.to_string())
    }

    /// One page of the members of a Congress, House only.
    pub async fn house_page(
        &self,
        congress: u32,
        limit: u32,
        offset: u32,
    ) -> Result<MemberListResponse, FetchError> {
        let url = format!("{}/member/congress/{}", self.base_url, congress);
        self.http
            .get_json(
                &url,
                &[
                    ("chamber", "house".to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                    ("api_key", self.key()),
                ],
            )
            .await
    }

    /// Current members for one state (both chambers).
    pub async fn state_members(
        &self,
        state_code: &str,
        limit: u32,
    ) -> Result<MemberListResponse, FetchError> {
        let url = format!("{}/member/{}", self.base_url, segment(state_code));
        self.http
            .get_json(
                &url,
                &[
                    ("currentMember", "true".to_string()),
                    ("limit", limit.to_string()),
                    ("api_key", self.key()),
                ],
            )
            .await
    }

    pub async fn member_detail(&self, bioguide_id: &str) -> Result<MemberDetailResponse, FetchError> {
        let url = format!("{}/member/{}", self.base_url, segment(bioguide_id));
        self.http.get_json(&url, &[("api_key", self.key())]).await
    }

    /// Member detail passed through untouched.
    pub async fn member_detail_raw(&self, bioguide_id: &str) -> Result<Value, FetchError> {
        let url = format!("{}/member/{}", self.base_url, segment(bioguide_id));
        self.http.get_json(&url, &[("api_key", self.key())]).await
    }

    pub async fn sponsored_legislation(
        &self,
        bioguide_id: &str,
    ) -> Result<LegislationListResponse, FetchError> {
        let url = format!(
            "{}/member/{}/sponsored-legislation",
            self.base_url,
            segment(bioguide_id)
        );
        self.http.get_json(&url, &[("api_key", self.key())]).await
    }

    pub async fn cosponsored_legislation(
        &self,
        bioguide_id: &str,
    ) -> Result<LegislationListResponse, FetchError> {
        let url = format!(
            "{}/member/{}/cosponsored-legislation",
            self.base_url,
            segment(bioguide_id)
        );
        self.http.get_json(&url, &[("api_key", self.key())]).await
    }
}
