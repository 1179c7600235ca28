use super::state::AppState;
use crate::error::AppError;
use crate::models::{DonationsReport, MemberFinances, MemberStats, StateDetail, WhiteHouse};
use crate::service::{congress::CongressResponse, white_house, CongressQuery};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

type Shared = State<Arc<AppState>>;

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DonationsQuery {
    pub party: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleAQuery {
    pub per_page: Option<String>,
    pub two_year_transaction_period: Option<String>,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Political Transparency API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// GET /api/congress
pub async fn congress(
    State(state): Shared,
    Query(query): Query<CongressQuery>,
) -> Result<Json<CongressResponse>, AppError> {
    state.congress.congress(&query).await.map(Json)
}

/// GET /api/member/stats?id=
pub async fn member_stats(
    State(state): Shared,
    Query(query): Query<IdQuery>,
) -> Result<Json<MemberStats>, AppError> {
    state.members.member_stats(query.id.as_deref()).await.map(Json)
}

/// GET /api/member/finances?id=
pub async fn member_finances(
    State(state): Shared,
    Query(query): Query<IdQuery>,
) -> Result<Json<Option<MemberFinances>>, AppError> {
    state.members.member_finances(query.id.as_deref()).await.map(Json)
}

/// GET /api/donations?party=&detail=
pub async fn donations(State(state): Shared, Query(query): Query<DonationsQuery>) -> Json<DonationsReport> {
    let detail = matches!(query.detail.as_deref(), Some("true") | Some("1"));
    Json(state.donations.donations(query.party.as_deref(), detail).await)
}

pub async fn white_house_handler() -> Json<WhiteHouse> {
    Json(white_house())
}

/// GET /api/state/:abbr
pub async fn state_detail(State(state): Shared, Path(abbr): Path<String>) -> Result<Json<StateDetail>, AppError> {
    state.congress.state_detail(&abbr).await.map(Json)
}

// Pass-through proxies.

pub async fn proxy_member(State(state): Shared, Path(id): Path<String>) -> Result<Json<Value>, AppError> {
    state.proxy.congress_member(&id).await.map(Json)
}

pub async fn proxy_candidate_search(
    State(state): Shared,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    state
        .proxy
        .candidate_search(query.q.as_deref(), query.per_page.as_deref())
        .await
        .map(Json)
}

pub async fn proxy_candidate_totals(
    State(state): Shared,
    Path(candidate_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.proxy.candidate_totals(&candidate_id).await.map(Json)
}

pub async fn proxy_candidate_committees(
    State(state): Shared,
    Path(candidate_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.proxy.candidate_committees(&candidate_id).await.map(Json)
}

pub async fn proxy_committee_schedule_a(
    State(state): Shared,
    Path(committee_id): Path<String>,
    Query(query): Query<ScheduleAQuery>,
) -> Result<Json<Value>, AppError> {
    state
        .proxy
        .committee_schedule_a(
            &committee_id,
            query.per_page.as_deref(),
            query.two_year_transaction_period.as_deref(),
        )
        .await
        .map(Json)
}

pub async fn proxy_schedules(
    State(state): Shared,
    Path(slug): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    state.proxy.schedules(&slug, &query).await.map(Json)
}
