//! Aggregation passes over upstream member and finance listings.
//!
//! Everything here is pure: callers fetch, these functions filter, bucket,
//! and sum.

use super::normalize::{
    district_sort_key, is_current_house_term, is_current_senate_term, normalize_party_name,
    senate_control, years_in_service,
};
use super::states::{is_territory, state_code, state_name};
use crate::models::{
    CandidateContributions, Chamber, ChamberTally, ContributorTotal, District, DonorTypeShares,
    FlatMember, HouseByState, MemberPage, Party, PartyAggregate, Representative, SenateMap,
    SenatorSummary, StateDetail, StateHouse, StateSenate,
};
use crate::remote::{CandidateTotals, ContactDirectory, RawMember, RawTerm, ScheduleARow};
use std::collections::HashMap;

/// Voting seats in the House.
pub const HOUSE_SEATS: u32 = 435;

/// Contributors kept per candidate and per party.
pub const TOP_CONTRIBUTORS: usize = 50;

/// Receipts above this mark a totals row as a real campaign.
const SUBSTANTIAL_RECEIPTS: f64 = 10_000.0;

/// Voting House members whose latest term is still running.
pub fn current_house_members<'a>(
    roster: &'a [RawMember],
    year: i32,
) -> impl Iterator<Item = (&'a RawMember, &'a RawTerm)> + 'a {
    roster.iter().filter_map(move |member| {
        if is_territory(member.state.as_deref().unwrap_or("")) {
            return None;
        }
        let term = member.latest_term()?;
        is_current_house_term(term, year).then_some((member, term))
    })
}

/// Party breakdown of the House.
pub fn tally_house(roster: &[RawMember], year: i32) -> ChamberTally {
    let mut tally = ChamberTally::default();

    for (member, _) in current_house_members(roster, year) {
        match normalize_party_name(member.party_name.as_deref()) {
            Party::Republican => tally.republicans += 1,
            Party::Democrat => tally.democrats += 1,
            Party::Independent => tally.independents += 1,
            _ => {}
        }
    }

    tally.vacant = HOUSE_SEATS.saturating_sub(tally.filled());
    tally
}

/// Senate delegation of one state, or `None` when no current senator is listed.
pub fn senate_composition(
    code: &str,
    members: &[RawMember],
    year: i32,
    directory: &ContactDirectory,
) -> Option<StateSenate> {
    let senators: Vec<SenatorSummary> = members
        .iter()
        .filter_map(|member| {
            let term = member.latest_term()?;
            is_current_senate_term(term, year).then(|| senator_summary(member, term, directory))
        })
        .collect();

    if senators.is_empty() {
        return None;
    }

    let parties: Vec<Party> = senators.iter().map(|s| s.party.clone()).collect();
    Some(StateSenate {
        name: state_name(code).unwrap_or(code).to_string(),
        control: senate_control(&parties),
        senators,
    })
}

fn senator_summary(member: &RawMember, term: &RawTerm, directory: &ContactDirectory) -> SenatorSummary {
    let contact = member.bioguide_id.as_deref().and_then(|id| directory.get(id));

    SenatorSummary {
        name: member.display_name(),
        party: normalize_party_name(member.party_name.as_deref()),
        bioguide_id: member.bioguide_id.clone(),
        depiction: member.image_url(),
        start_year: term.start_year,
        office_phone: contact.and_then(|c| c.phone.clone()),
        contact_form: contact.and_then(|c| c.contact_form.clone()),
    }
}

/// Current representatives grouped by state code, sorted by district.
pub fn house_by_state(roster: &[RawMember], year: i32, directory: &ContactDirectory) -> HouseByState {
    let mut by_state = HouseByState::new();

    for (member, term) in current_house_members(roster, year) {
        let Some(code) = member.state.as_deref().and_then(state_code) else {
            continue;
        };

        let contact = member.bioguide_id.as_deref().and_then(|id| directory.get(id));
        let district = member
            .district_for(term)
            .unwrap_or_else(|| "At-Large".to_string());
        let office_phone = term
            .phone()
            .or_else(|| member.phone())
            .map(String::from)
            .or_else(|| contact.and_then(|c| c.phone.clone()));

        by_state
            .entry(code.to_string())
            .or_insert_with(|| StateHouse {
                name: state_name(code).unwrap_or(code).to_string(),
                representatives: Vec::new(),
            })
            .representatives
            .push(Representative {
                name: member.display_name(),
                party: normalize_party_name(member.party_name.as_deref()),
                bioguide_id: member.bioguide_id.clone(),
                district,
                depiction: member.image_url(),
                start_year: term.start_year,
                office_phone,
                contact_form: contact.and_then(|c| c.contact_form.clone()),
            });
    }

    for state in by_state.values_mut() {
        state
            .representatives
            .sort_by_key(|r| district_sort_key(&r.district));
    }

    by_state
}

/// One list of every senator and representative.
pub fn flatten_members(senate: &SenateMap, house: &HouseByState) -> Vec<FlatMember> {
    let mut list = Vec::new();

    for (code, state) in senate {
        for s in &state.senators {
            list.push(FlatMember {
                id: s
                    .bioguide_id
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}-senate", s.name, code)),
                name: s.name.clone(),
                party: s.party.clone(),
                state: state.name.clone(),
                state_code: code.clone(),
                district: Some("Senator".to_string()),
                chamber: Chamber::Senate,
                portrait_url: s.depiction.clone(),
                years_in_service: 0,
            });
        }
    }

    for (code, state) in house {
        for r in &state.representatives {
            list.push(FlatMember {
                id: r
                    .bioguide_id
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}-house", r.name, code)),
                name: r.name.clone(),
                party: r.party.clone(),
                state: state.name.clone(),
                state_code: code.clone(),
                district: Some(r.district.clone()),
                chamber: Chamber::House,
                portrait_url: r.depiction.clone(),
                years_in_service: 0,
            });
        }
    }

    list
}

/// Search and filter criteria for the flattened directory.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    /// Lowercased substring to look for in names.
    pub query: Option<String>,
    /// Uppercased state code.
    pub state: Option<String>,
    /// Lowercased party word (`d`/`r`/`i` already expanded).
    pub party: Option<String>,
    pub chamber: Option<String>,
}

impl MemberFilter {
    /// Build a filter from raw query parameters; `all` and blanks disable a criterion.
    pub fn from_params(
        q: Option<&str>,
        state: Option<&str>,
        party: Option<&str>,
        chamber: Option<&str>,
    ) -> Self {
        fn active(value: Option<&str>) -> Option<&str> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
        }

        let party = active(party).map(|p| match p.to_lowercase().as_str() {
            "d" => "democrat".to_string(),
            "r" => "republican".to_string(),
            "i" => "independent".to_string(),
            other => other.to_string(),
        });

        Self {
            query: q
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            state: active(state).map(str::to_uppercase),
            party,
            chamber: active(chamber).map(str::to_lowercase),
        }
    }

    pub fn matches(&self, member: &FlatMember) -> bool {
        if let Some(ref q) = self.query {
            if !member.name.to_lowercase().contains(q.as_str()) {
                return false;
            }
        }
        if let Some(ref state) = self.state {
            if member.state_code.to_uppercase() != *state {
                return false;
            }
        }
        if let Some(ref party) = self.party {
            if !member.party.to_string().to_lowercase().contains(party.as_str()) {
                return false;
            }
        }
        if let Some(ref chamber) = self.chamber {
            if member.chamber.to_string() != *chamber {
                return false;
            }
        }
        true
    }
}

pub fn filter_members(list: Vec<FlatMember>, filter: &MemberFilter) -> Vec<FlatMember> {
    list.into_iter().filter(|m| filter.matches(m)).collect()
}

/// Fill `years_in_service` from the legislators directory.
pub fn apply_years_in_service(list: &mut [FlatMember], directory: &ContactDirectory, year: i32) {
    for member in list.iter_mut() {
        member.years_in_service = directory
            .get(&member.id)
            .map_or(0, |entry| years_in_service(&entry.start_years, year));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    YearsAsc,
    YearsDesc,
}

impl SortOrder {
    /// Unknown values fall back to alphabetical.
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("az") {
            "za" => SortOrder::NameDesc,
            "years-asc" => SortOrder::YearsAsc,
            "years-desc" => SortOrder::YearsDesc,
            _ => SortOrder::NameAsc,
        }
    }
}

fn name_order(a: &FlatMember, b: &FlatMember) -> std::cmp::Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_members(list: &mut [FlatMember], order: SortOrder) {
    match order {
        SortOrder::NameAsc => list.sort_by(name_order),
        SortOrder::NameDesc => list.sort_by(|a, b| name_order(b, a)),
        SortOrder::YearsAsc => list.sort_by_key(|m| m.years_in_service),
        SortOrder::YearsDesc => list.sort_by_key(|m| std::cmp::Reverse(m.years_in_service)),
    }
}

/// Slice a filtered list; no limit returns everything.
pub fn paginate(list: Vec<FlatMember>, limit: Option<usize>, offset: usize) -> MemberPage {
    let total = list.len();
    let items = match limit {
        Some(limit) => list.into_iter().skip(offset).take(limit).collect(),
        None => list,
    };
    MemberPage { total, items }
}

/// Running per-contributor sums over Schedule A pages.
#[derive(Debug, Default)]
pub struct ContributionLedger {
    by_contributor: HashMap<String, ContributorTotal>,
    total: f64,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, row: &ScheduleARow) {
        let name = row.contributor_label();
        let amount = row.amount();

        self.by_contributor
            .entry(name.clone())
            .or_insert_with(|| ContributorTotal {
                name,
                amount: 0.0,
                committee_id: row.contributor_id.clone().filter(|id| !id.is_empty()),
            })
            .amount += amount;
        self.total += amount;
    }

    pub fn finish(self) -> CandidateContributions {
        CandidateContributions {
            total: self.total,
            top_contributors: top_by_amount(self.by_contributor.into_values().collect()),
        }
    }
}

fn top_by_amount(mut totals: Vec<ContributorTotal>) -> Vec<ContributorTotal> {
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    totals.truncate(TOP_CONTRIBUTORS);
    totals
}

/// Merge per-candidate contributor lists into one party-level view.
pub fn merge_party_contributions(candidates: &[CandidateContributions]) -> PartyAggregate {
    let mut merged: HashMap<String, ContributorTotal> = HashMap::new();
    let mut shares = DonorTypeShares::default();

    for candidate in candidates {
        shares.party_total += candidate.total;

        for entry in &candidate.top_contributors {
            merged
                .entry(entry.name.clone())
                .or_insert_with(|| ContributorTotal {
                    name: entry.name.clone(),
                    amount: 0.0,
                    committee_id: None,
                })
                .amount += entry.amount;

            if entry.committee_id.is_some() {
                shares.pac_total += entry.amount;
            } else {
                shares.individual_total += entry.amount;
            }
        }
    }

    let companies = top_by_amount(merged.into_values().collect());
    if shares.party_total == 0.0 {
        shares.party_total = companies.iter().map(|c| c.amount).sum();
    }

    PartyAggregate {
        top_companies: companies,
        donor_type_shares: shares,
    }
}

/// Pick the totals row describing the candidate's most recent real campaign
/// up to `cycle`.
pub fn select_latest_totals(results: &[CandidateTotals], cycle: i32) -> Option<&CandidateTotals> {
    fn pick<'a>(rows: &[&'a CandidateTotals]) -> Option<&'a CandidateTotals> {
        rows.iter()
            .find(|r| r.receipts.unwrap_or(0.0) > SUBSTANTIAL_RECEIPTS)
            .or_else(|| rows.first())
            .copied()
    }

    let mut past: Vec<&CandidateTotals> = results
        .iter()
        .filter(|r| r.candidate_election_year.is_some_and(|y| y <= cycle))
        .collect();
    past.sort_by_key(|r| std::cmp::Reverse(r.candidate_election_year));

    pick(&past).or_else(|| pick(&results.iter().collect::<Vec<_>>()))
}

/// Districts and senators of one state.
pub fn state_detail(code: &str, senate: &SenateMap, house: &HouseByState) -> StateDetail {
    let code = code.to_uppercase();
    let mut districts: Vec<District> = Vec::new();

    if let Some(state) = house.get(&code) {
        for rep in &state.representatives {
            if districts.iter().all(|d| d.district != rep.district) {
                districts.push(District {
                    district: rep.district.clone(),
                    representative: rep.clone(),
                });
            }
        }
    }

    StateDetail {
        state_name: state_name(&code).unwrap_or(&code).to_string(),
        senators: senate
            .get(&code)
            .map(|s| s.senators.clone())
            .unwrap_or_default(),
        districts,
        state: code,
    }
}
