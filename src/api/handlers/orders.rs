use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    api::{AppJson, AppPath, AppState},
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{Order, OrderId, OrderStatus},
    services::orders::place_order,
};

use super::MessageResponse;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}

/// Places an order from the caller's cart
pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = place_order(
        state.orders.as_ref(),
        state.activities.as_ref(),
        auth.user_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// The caller's orders, or every order for admins
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Order>>> {
    let owner = (!auth.is_admin).then_some(auth.user_id);
    Ok(Json(state.orders.list(owner).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<OrderId>,
) -> AppResult<Json<Order>> {
    state
        .orders
        .find_by_id(id)
        .await?
        .filter(|order| order.is_visible_to(auth.user_id, auth.is_admin))
        .map(Json)
        .ok_or_else(not_found)
}

/// Moves an order to a new status (admin only)
pub async fn update_order_status(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<OrderId>,
    AppJson(request): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    auth.require_admin()?;

    let status = request
        .status
        .parse::<OrderStatus>()
        .map_err(|_| AppError::InvalidInput("Invalid status".to_string()))?;

    let order = state
        .orders
        .update_status(id, status)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(order_id = %id, status = %status, "Order status updated");
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<OrderId>,
) -> AppResult<Json<MessageResponse>> {
    let visible = state
        .orders
        .find_by_id(id)
        .await?
        .is_some_and(|order| order.is_visible_to(auth.user_id, auth.is_admin));

    if !visible || !state.orders.delete(id).await? {
        return Err(not_found());
    }

    Ok(Json(MessageResponse::new("Order deleted")))
}
