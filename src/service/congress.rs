//! Congress composition views: House tally, Senate map, House by state, and
//! the flattened member directory.

use crate::analysis::aggregator::{
    apply_years_in_service, filter_members, flatten_members, house_by_state, paginate,
    senate_composition, sort_members, state_detail, tally_house, MemberFilter, SortOrder,
};
use crate::analysis::normalize::current_congress_number;
use crate::analysis::states::state_codes;
use crate::cache::{CongressSnapshot, SnapshotCell, TtlCache};
use crate::config::CongressConfig;
use crate::error::AppError;
use crate::models::{
    ChamberTally, CongressOverview, DetailedCongress, HouseByState, MemberPage, SenateMap,
    StateDetail,
};
use crate::remote::{CongressApi, ContactDirectory, LegislatorsApi, RawMember};
use chrono::{DateTime, Datelike, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Query string of `GET /api/congress`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CongressQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub flat: Option<String>,
    pub q: Option<String>,
    pub state: Option<String>,
    pub party: Option<String>,
    pub chamber: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl CongressQuery {
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Default::default()
        }
    }

    fn is_flat(&self) -> bool {
        matches!(self.flat.as_deref(), Some("1") | Some("true"))
    }

    /// Page size. Absent means no limit; junk or a negative gives an empty page.
    fn page_limit(&self) -> Option<usize> {
        let n = numeric(self.limit.as_deref().filter(|s| !s.is_empty())?);
        if n == f64::INFINITY {
            None
        } else if n > 0.0 {
            Some(n as usize)
        } else {
            Some(0)
        }
    }

    fn page_offset(&self) -> usize {
        self.offset
            .as_deref()
            .map(numeric)
            .filter(|n| *n > 0.0)
            .map_or(0, |n| n as usize)
    }
}

/// Query numbers coerce like a browser's `Number()`: blank is 0, junk is NaN.
fn numeric(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        0.0
    } else {
        raw.parse().unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongressView {
    House,
    Senate,
    All,
    Detailed,
}

impl CongressView {
    pub fn parse(kind: Option<&str>) -> Result<Self, AppError> {
        match kind {
            Some("house") => Ok(CongressView::House),
            Some("senate") => Ok(CongressView::Senate),
            Some("all") => Ok(CongressView::All),
            Some("detailed") => Ok(CongressView::Detailed),
            _ => Err(AppError::bad_request("Invalid type parameter")),
        }
    }

    fn parts(self) -> Parts {
        match self {
            CongressView::House => Parts {
                house: true,
                ..Default::default()
            },
            CongressView::Senate => Parts {
                senate: true,
                ..Default::default()
            },
            CongressView::All => Parts {
                house: true,
                senate: true,
                house_by_state: false,
            },
            CongressView::Detailed => Parts {
                house: true,
                senate: true,
                house_by_state: true,
            },
        }
    }
}

/// Snapshot parts a request needs.
#[derive(Debug, Clone, Copy, Default)]
struct Parts {
    house: bool,
    senate: bool,
    house_by_state: bool,
}

/// Body of `GET /api/congress`; the shape depends on the requested view.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CongressResponse {
    House(ChamberTally),
    Senate(Arc<SenateMap>),
    Overview(CongressOverview),
    Detailed(DetailedCongress),
    Flat(MemberPage),
}

pub struct CongressService {
    api: CongressApi,
    legislators: LegislatorsApi,
    settings: CongressConfig,
    snapshot: SnapshotCell,
    directory: TtlCache<(), Arc<ContactDirectory>>,
}

impl CongressService {
    pub fn new(api: CongressApi, legislators: LegislatorsApi, settings: CongressConfig) -> Self {
        Self {
            api,
            legislators,
            settings,
            snapshot: SnapshotCell::default(),
            directory: TtlCache::new(),
        }
    }

    pub async fn congress(&self, query: &CongressQuery) -> Result<CongressResponse, AppError> {
        let view = CongressView::parse(query.kind.as_deref())?;
        let current = self.refresh(view.parts()).await;

        let response = match view {
            CongressView::House => CongressResponse::House(current.house.unwrap_or_default()),
            CongressView::Senate => CongressResponse::Senate(current.senate.unwrap_or_default()),
            CongressView::All => CongressResponse::Overview(CongressOverview {
                senate: current.senate,
                house: current.house,
            }),
            CongressView::Detailed if query.is_flat() => {
                CongressResponse::Flat(self.member_page(&current, query).await)
            }
            CongressView::Detailed => CongressResponse::Detailed(DetailedCongress {
                senate: current.senate,
                house: current.house,
                house_by_state: current.house_by_state,
            }),
        };

        Ok(response)
    }

    /// Districts and senators of one state, from the shared snapshot.
    pub async fn state_detail(&self, abbr: &str) -> Result<StateDetail, AppError> {
        if abbr.chars().count() != 2 {
            return Err(AppError::bad_request(
                "State abbreviation must be 2 characters",
            ));
        }

        let current = self
            .refresh(Parts {
                house: false,
                senate: true,
                house_by_state: true,
            })
            .await;

        let empty_senate = SenateMap::new();
        let empty_house = HouseByState::new();
        Ok(state_detail(
            abbr,
            current.senate.as_deref().unwrap_or(&empty_senate),
            current.house_by_state.as_deref().unwrap_or(&empty_house),
        ))
    }

    /// Bring the requested snapshot parts up to date and return a copy.
    ///
    /// Freshness is judged once per call against the shared timestamp.
    async fn refresh(&self, parts: Parts) -> CongressSnapshot {
        let mut current = self.snapshot.read();
        let fresh = current.is_fresh(self.settings.cache_ttl());
        let now = Utc::now();
        let year = now.year();
        let mut roster = None;

        if parts.house && (!fresh || current.house.is_none()) {
            debug!("House tally cache miss");
            let tally = tally_house(self.load_roster(&mut roster, now).await, year);
            info!(
                "House: {} R, {} D, {} I, {} vacant",
                tally.republicans, tally.democrats, tally.independents, tally.vacant
            );
            current.house = Some(tally);
            self.snapshot.update(|s| s.set_house(tally));
        }

        if parts.senate && (!fresh || current.senate.is_none()) {
            debug!("Senate cache miss");
            let senate = self.fetch_senate(year).await;
            info!("Senate: {} states with current senators", senate.len());
            current.senate = Some(self.snapshot.update(|s| s.set_senate(senate)));
        }

        if parts.house_by_state && (!fresh || current.house_by_state.is_none()) {
            debug!("House-by-state cache miss");
            let directory = self.directory().await;
            let by_state = house_by_state(self.load_roster(&mut roster, now).await, year, &directory);
            current.house_by_state = Some(self.snapshot.update(|s| s.set_house_by_state(by_state)));
        }

        current
    }

    async fn load_roster<'a>(
        &self,
        slot: &'a mut Option<Vec<RawMember>>,
        now: DateTime<Utc>,
    ) -> &'a [RawMember] {
        if slot.is_none() {
            *slot = Some(self.house_roster(current_congress_number(now)).await);
        }
        slot.get_or_insert_with(Vec::new)
    }

    /// Every House member listed for `congress`.
    ///
    /// Stops at the reported count, on a short or empty page, or on the first
    /// failed request; whatever was read so far is kept.
    async fn house_roster(&self, congress: u32) -> Vec<RawMember> {
        let limit = self.settings.page_limit.max(1);
        let mut offset: u32 = 0;
        let mut total: Option<u64> = None;
        let mut roster = Vec::new();

        loop {
            if total.is_some_and(|t| u64::from(offset) >= t) {
                break;
            }

            let page = match self.api.house_page(congress, limit, offset).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("House roster fetch stopped at offset {}: {}", offset, e);
                    break;
                }
            };

            let count = page.members.len();
            if let Some(reported) = page.pagination.as_ref().and_then(|p| p.count) {
                total = Some(reported);
            } else if count < limit as usize {
                total = Some(u64::from(offset) + count as u64);
            }

            roster.extend(page.members);
            if count == 0 {
                break;
            }
            offset += count as u32;
        }

        debug!("Read {} House roster entries for congress {}", roster.len(), congress);
        roster
    }

    /// Senate delegations of all 50 states, fetched in concurrent batches.
    async fn fetch_senate(&self, year: i32) -> SenateMap {
        let directory = self.directory().await;
        let codes: Vec<&'static str> = state_codes().collect();
        let mut senate = SenateMap::new();

        for batch in codes.chunks(self.settings.state_batch_size.max(1)) {
            let results = join_all(batch.iter().map(|&code| async move {
                (code, self.api.state_members(code, self.settings.page_limit).await)
            }))
            .await;

            for (code, result) in results {
                match result {
                    Ok(listing) => {
                        if let Some(state) =
                            senate_composition(code, &listing.members, year, &directory)
                        {
                            senate.insert(code.to_string(), state);
                        }
                    }
                    Err(e) => warn!("Senate fetch for {} failed: {}", code, e),
                }
            }
        }

        senate
    }

    /// Legislators directory; a failed download caches an empty directory.
    async fn directory(&self) -> Arc<ContactDirectory> {
        if let Some(directory) = self.directory.get_fresh(&(), self.settings.directory_ttl()) {
            return directory;
        }

        let directory = match self.legislators.fetch().await {
            Ok(directory) => {
                debug!("Loaded {} legislators directory entries", directory.len());
                directory
            }
            Err(e) => {
                warn!("Legislators directory unavailable: {}", e);
                ContactDirectory::default()
            }
        };

        let directory = Arc::new(directory);
        self.directory.insert((), Arc::clone(&directory));
        directory
    }

    async fn member_page(&self, current: &CongressSnapshot, query: &CongressQuery) -> MemberPage {
        let empty_senate = SenateMap::new();
        let empty_house = HouseByState::new();
        let list = flatten_members(
            current.senate.as_deref().unwrap_or(&empty_senate),
            current.house_by_state.as_deref().unwrap_or(&empty_house),
        );

        let filter = MemberFilter::from_params(
            query.q.as_deref(),
            query.state.as_deref(),
            query.party.as_deref(),
            query.chamber.as_deref(),
        );
        let mut list = filter_members(list, &filter);

        let directory = self.directory().await;
        apply_years_in_service(&mut list, &directory, Utc::now().year());
        sort_members(&mut list, SortOrder::parse(query.sort.as_deref()));

        paginate(list, query.page_limit(), query.page_offset())
    }
}
