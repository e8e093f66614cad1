//! `/api/orders`

use crate::api::{ApiError, ApiJson, ApiQuery, ApiResult, IdPath};
use crate::app::AppState;
use admin_store::{Id, NewOrder, Order, OrderUpdate};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub lead_id: Option<Id>,
}

/// Orders must point at rows that exist.
async fn check_references(
    state: &AppState,
    lead_id: Option<Id>,
    website_template_id: Option<Id>,
    email_template_id: Option<Id>,
) -> ApiResult<()> {
    if let Some(id) = lead_id {
        if state.store.get_lead(id).await?.is_none() {
            return Err(ApiError::bad_request(format!("Unknown lead: {id}")));
        }
    }
    if let Some(id) = website_template_id {
        if state.store.get_website_template(id).await?.is_none() {
            return Err(ApiError::bad_request(format!("Unknown website template: {id}")));
        }
    }
    if let Some(id) = email_template_id {
        if state.store.get_email_template(id).await?.is_none() {
            return Err(ApiError::bad_request(format!("Unknown email template: {id}")));
        }
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = match query.lead_id {
        Some(lead_id) => state.store.list_orders_for_lead(lead_id).await?,
        None => state.store.list_orders().await?,
    };
    Ok(Json(orders))
}

pub async fn get(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<Json<Order>> {
    state
        .store
        .get_order(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    check_references(
        &state,
        Some(input.lead_id),
        Some(input.website_template_id),
        Some(input.email_template_id),
    )
    .await?;
    let order = state.store.create_order(input).await?;
    tracing::info!(order_id = order.id, lead_id = order.lead_id, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(update): ApiJson<OrderUpdate>,
) -> ApiResult<Json<Order>> {
    check_references(
        &state,
        update.lead_id,
        update.website_template_id,
        update.email_template_id,
    )
    .await?;
    state
        .store
        .update_order(id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

pub async fn remove(State(state): State<AppState>, IdPath(id): IdPath) -> ApiResult<StatusCode> {
    if state.store.delete_order(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Order not found"))
    }
}
