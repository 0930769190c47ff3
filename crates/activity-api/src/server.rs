//! Axum server and routes.

use activity_log::aggregate::MAX_DAILY_DAYS;
use activity_log::{
    ActivityAction, ActivityDraft, ActivityLog, ActivityRecord, ActivityStats, Actor,
    BaseResponse, DailyCount, EmployeeSummary, FilterCriteria,
};
use axum::{
    extract::{Path, Query, State},
    http::{header::USER_AGENT, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

const DEFAULT_DAILY_DAYS: u32 = 7;

pub struct AppState {
    pub log: Arc<ActivityLog>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/activity/record", post(handle_record))
        .route("/activity/filter", post(handle_filter))
        .route("/activity/search", get(handle_search))
        .route("/activity/stats", get(handle_stats))
        .route("/activity/daily", get(handle_daily))
        .route("/activity/employees", get(handle_all_employees))
        .route("/activity/employees/:user_id", get(handle_employee))
        .route("/activity/prune", post(handle_prune))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A page of records plus the match count before paging.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityPage {
    pub total: usize,
    pub records: Vec<ActivityRecord>,
}

fn page(records: Vec<ActivityRecord>, limit: Option<u32>, offset: Option<u32>) -> ActivityPage {
    let total = records.len();
    let offset = offset.unwrap_or(0) as usize;
    let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
    ActivityPage {
        total,
        records: records.into_iter().skip(offset).take(limit).collect(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    #[serde(default)]
    pub actor: Option<Actor>,
    #[serde(flatten)]
    pub draft: ActivityDraft,
}

async fn handle_record(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RecordRequest>,
) -> Json<BaseResponse<ActivityRecord>> {
    let mut draft = req.draft;
    if draft.context.user_agent.is_none() {
        draft.context.user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }
    match state.log.record(req.actor.as_ref(), draft).await {
        Ok(Some(record)) => {
            tracing::debug!(id = %record.id, section = %record.section, "activity recorded");
            Json(BaseResponse::ok(record))
        }
        Ok(None) => Json(BaseResponse {
            code: 200,
            message: "no acting user; activity dropped".to_string(),
            data: None,
        }),
        Err(e) => Json(BaseResponse::error(500, e.to_string())),
    }
}

/// Filter request as sent by clients: dates may be RFC 3339 instants or plain
/// `YYYY-MM-DD` days.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub vin_number: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default)]
    pub car_brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

/// Parse a date bound. A bare date is widened to the start (or end) of that UTC day.
fn parse_bound(raw: &str, end_of_day: bool) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date: {}", raw))?;
    let naive = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| format!("invalid date: {}", raw))?;
    Ok(Some(Utc.from_utc_datetime(&naive)))
}

impl FilterRequest {
    pub fn to_criteria(&self) -> Result<FilterCriteria, String> {
        Ok(FilterCriteria {
            section: self.section.clone(),
            action: self
                .action
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(ActivityAction::parse),
            user_id: self.user_id.clone(),
            entity_type: self.entity_type.clone(),
            date_from: match self.date_from.as_deref() {
                Some(raw) => parse_bound(raw, false)?,
                None => None,
            },
            date_to: match self.date_to.as_deref() {
                Some(raw) => parse_bound(raw, true)?,
                None => None,
            },
            search: self.search.clone(),
            vin_number: self.vin_number.clone(),
            part_number: self.part_number.clone(),
            car_model: self.car_model.clone(),
            car_brand: self.car_brand.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
        })
    }
}

async fn handle_filter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FilterRequest>,
) -> Json<BaseResponse<ActivityPage>> {
    let criteria = match req.to_criteria() {
        Ok(c) => c,
        Err(msg) => return Json(BaseResponse::error(400, msg)),
    };
    let records = state.log.filter(&criteria).await;
    Json(BaseResponse::ok(page(records, req.limit, req.offset)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

async fn handle_search(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> Json<BaseResponse<ActivityPage>> {
    let records = state.log.advanced_search(&q.q).await;
    Json(BaseResponse::ok(page(records, q.limit, q.offset)))
}

async fn handle_stats(State(state): State<Arc<AppState>>) -> Json<BaseResponse<ActivityStats>> {
    Json(BaseResponse::ok(state.log.stats().await))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

async fn handle_daily(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DailyQuery>,
) -> Json<BaseResponse<Vec<DailyCount>>> {
    let days = q.days.unwrap_or(DEFAULT_DAILY_DAYS);
    if days > MAX_DAILY_DAYS {
        return Json(BaseResponse::error(
            400,
            format!("days must be at most {}", MAX_DAILY_DAYS),
        ));
    }
    Json(BaseResponse::ok(state.log.daily_counts(days).await))
}

async fn handle_all_employees(
    State(state): State<Arc<AppState>>,
) -> Json<BaseResponse<Vec<EmployeeSummary>>> {
    Json(BaseResponse::ok(state.log.all_employees_summary().await))
}

async fn handle_employee(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<BaseResponse<EmployeeSummary>> {
    match state.log.employee_summary(&user_id).await {
        Some(summary) => Json(BaseResponse::ok(summary)),
        None => Json(BaseResponse::error(404, "no activity for employee")),
    }
}

#[derive(Debug, Deserialize)]
pub struct PruneRequest {
    pub days: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PruneResult {
    pub removed: usize,
}

async fn handle_prune(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PruneRequest>,
) -> Json<BaseResponse<PruneResult>> {
    match state.log.prune_older_than(req.days).await {
        Ok(removed) => Json(BaseResponse::ok(PruneResult { removed })),
        Err(e) => Json(BaseResponse::error(500, e.to_string())),
    }
}

async fn handle_health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dates_widen_to_whole_day() {
        let from = parse_bound("2024-05-10", false).unwrap().unwrap();
        let to = parse_bound("2024-05-10", true).unwrap().unwrap();
        assert_eq!(from.to_rfc3339(), "2024-05-10T00:00:00+00:00");
        assert_eq!(to.timestamp_millis() - from.timestamp_millis(), 86_399_999);
    }

    #[test]
    fn rfc3339_bounds_are_kept_exact() {
        let ts = parse_bound("2024-05-10T08:30:00+02:00", false).unwrap().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-10T06:30:00+00:00");
        assert!(parse_bound("  ", true).unwrap().is_none());
        assert!(parse_bound("10/05/2024", false).is_err());
    }

    #[test]
    fn paging_reports_total_before_slicing() {
        let req = FilterRequest {
            action: Some(String::new()),
            ..Default::default()
        };
        assert!(req.to_criteria().unwrap().action.is_none());
        let p = page(Vec::new(), Some(5), Some(10));
        assert_eq!(p.total, 0);
        assert!(p.records.is_empty());
    }
}
