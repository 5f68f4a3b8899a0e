use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    Extension,
};
use orderdesk_models::{Capability, NewOrder, OrderPage, OrderQuery, OrderRecord, OrderUpdate, Session};
use orderdesk_utils::{validate_model, OrderDeskError};
use uuid::Uuid;

use crate::{middleware::ApiError, AppState};

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> Result<Json<OrderPage>, ApiError> {
    session.require(Capability::ViewOrders)?;
    let Query(query) = query?;
    validate_model(&query)?;

    let page = state.store.list(&query).await?;
    Ok(Json(page))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderRecord>, ApiError> {
    session.require(Capability::ViewOrders)?;
    let Path(id) = id?;

    let order = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| OrderDeskError::not_found(format!("order {}", id)))?;
    Ok(Json(order))
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    order: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderRecord>), ApiError> {
    session.require(Capability::EditOrders)?;
    let Json(order) = order?;
    validate_model(&order)?;

    let record = state.store.insert(order).await?;
    tracing::info!(order_id = %record.id, user_id = %session.user_id, "Order created");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    id: Result<Path<Uuid>, PathRejection>,
    update: Result<Json<OrderUpdate>, JsonRejection>,
) -> Result<Json<OrderRecord>, ApiError> {
    session.require(Capability::EditOrders)?;
    let Path(id) = id?;
    let Json(update) = update?;
    validate_model(&update)?;

    let record = state.store.update(id, update).await?;
    tracing::info!(order_id = %record.id, user_id = %session.user_id, "Order updated");
    Ok(Json(record))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    session.require(Capability::EditOrders)?;
    let Path(id) = id?;

    state.store.delete(id).await?;
    tracing::info!(order_id = %id, user_id = %session.user_id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
