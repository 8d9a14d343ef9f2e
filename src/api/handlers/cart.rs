use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    api::{AppJson, AppPath, AppState},
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{ActivityKind, Cart, ProductId},
    services::activity::record_activity,
};

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// The caller's cart; empty if nothing was added yet
pub async fn get_cart(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Cart>> {
    let cart = state
        .carts
        .get(auth.user_id)
        .await?
        .unwrap_or_else(|| Cart::new(auth.user_id));
    Ok(Json(cart))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(request): AppJson<AddToCartRequest>,
) -> AppResult<(StatusCode, Json<Cart>)> {
    if request.quantity == 0 {
        return Err(AppError::InvalidInput("Quantity must be at least 1".to_string()));
    }

    if state.products.find_by_id(request.product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let mut cart = state
        .carts
        .get(auth.user_id)
        .await?
        .unwrap_or_else(|| Cart::new(auth.user_id));
    cart
        .add_item(request.product_id, request.quantity)
        .map_err(AppError::InvalidInput)?;
    state.carts.save(&cart).await?;

    record_activity(
        state.activities.as_ref(),
        auth.user_id,
        request.product_id,
        ActivityKind::AddedToCart,
    )
    .await;

    Ok((StatusCode::CREATED, Json(cart)))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(product_id): AppPath<ProductId>,
) -> AppResult<Json<Cart>> {
    let mut cart = state
        .carts
        .get(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    if cart.remove_item(product_id) {
        state.carts.save(&cart).await?;
    }

    Ok(Json(cart))
}
