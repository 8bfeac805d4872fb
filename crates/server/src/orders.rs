//! Checkout and back-office order endpoints. Write failures fan out to the
//! administrator alert channels; reads degrade to empty results.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use papyra_core::domain::order::{Order, OrderDraft, OrderId, OrderStatus};

use crate::bootstrap::AppState;
use crate::catalog::{store_unavailable, ApiError};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/orders", get(list_orders).post(create_order))
        .route("/api/v1/orders/{id}/status", patch(update_status))
        .route("/api/v1/orders/{id}/tracking", patch(update_tracking))
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<OrderId, (StatusCode, Json<ApiError>)> {
    Uuid::parse_str(raw).map(OrderId).map_err(|_| {
        (StatusCode::BAD_REQUEST, Json(ApiError { error: format!("invalid order id `{raw}`") }))
    })
}

async fn create_order(
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, Json<ApiError>)> {
    match state.orders.create(draft).await {
        Ok(order) => Ok((StatusCode::CREATED, Json(order))),
        Err(error) => {
            state.notifier.notify_failure("orders.create", &error.to_string()).await;
            Err(store_unavailable("orders.create", &error))
        }
    }
}

async fn list_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
    match state.orders.list_recent().await {
        Ok(orders) => Json(orders),
        Err(error) => {
            warn!(error = %error, "order listing failed; returning empty list");
            state.notifier.notify_failure("orders.list", &error.to_string()).await;
            Json(Vec::new())
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusUpdateRequest {
    status: String,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let id = parse_id(&id)?;
    let status: OrderStatus = request.status.parse().map_err(|error| {
        (StatusCode::BAD_REQUEST, Json(ApiError { error: format!("{error}") }))
    })?;

    match state.orders.update_status(&id, status).await {
        Ok(true) => Ok(Json(serde_json::json!({ "updated": true }))),
        Ok(false) => {
            Err((StatusCode::NOT_FOUND, Json(ApiError { error: "order not found".to_string() })))
        }
        Err(error) => {
            state.notifier.notify_failure("orders.update_status", &error.to_string()).await;
            Err(store_unavailable("orders.update_status", &error))
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrackingUpdateRequest {
    tracking_code: String,
}

async fn update_tracking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TrackingUpdateRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let id = parse_id(&id)?;
    if request.tracking_code.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: "tracking_code must not be empty".to_string() }),
        ));
    }

    match state.orders.set_tracking_code(&id, request.tracking_code.trim()).await {
        Ok(true) => Ok(Json(serde_json::json!({ "updated": true }))),
        Ok(false) => {
            Err((StatusCode::NOT_FOUND, Json(ApiError { error: "order not found".to_string() })))
        }
        Err(error) => {
            state.notifier.notify_failure("orders.update_tracking", &error.to_string()).await;
            Err(store_unavailable("orders.update_tracking", &error))
        }
    }
}
