//! `/api/leads`
//!
//! GET accepts `search`, plus comma-separated `industry` and `status` lists.

use crate::api::{ApiError, ApiJson, ApiQuery, ApiResult, IdPath};
use crate::app::AppState;
use admin_store::{Lead, LeadFilter, LeadStatus, LeadUpdate, NewLead};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct LeadQuery {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub status: Option<String>,
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl LeadQuery {
    fn into_filter(self) -> ApiResult<LeadFilter> {
        let statuses = split_list(self.status.as_deref())
            .map(|s| LeadStatus::parse(s).ok_or_else(|| ApiError::bad_request(format!("Unknown lead status: {s}"))))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(LeadFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            industries: split_list(self.industry.as_deref()).map(str::to_string).collect(),
            statuses,
        })
    }
}

fn require_contact(name: Option<&str>, email: Option<&str>) -> ApiResult<()> {
    let blank = |v: Option<&str>| v.is_some_and(|v| v.trim().is_empty());
    if blank(name) || blank(email) {
        return Err(ApiError::bad_request("Name and email are required"));
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LeadQuery>,
) -> ApiResult<Json<Vec<Lead>>> {
    let filter = query.into_filter()?;
    let leads = if filter.is_empty() {
        state.store.list_leads().await?
    } else {
        state.store.filter_leads(&filter).await?
    };
    Ok(Json(leads))
}

pub async fn get(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<Json<Lead>> {
    state
        .store
        .get_lead(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Lead not found"))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewLead>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    require_contact(Some(&input.name), Some(&input.email))?;
    let lead = state.store.create_lead(input).await?;
    tracing::info!(lead_id = lead.id, "Lead created");
    Ok((StatusCode::CREATED, Json(lead)))
}

pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(update): ApiJson<LeadUpdate>,
) -> ApiResult<Json<Lead>> {
    require_contact(update.name.as_deref(), update.email.as_deref())?;
    state
        .store
        .update_lead(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Lead not found"))
}

pub async fn remove(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<StatusCode> {
    if state.store.delete_lead(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Lead not found"))
    }
}
