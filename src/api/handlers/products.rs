use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::{AppJson, AppPath, AppState},
    error::{AppError, AppResult},
    middleware::{AuthUser, MaybeAuthUser},
    models::{ActivityKind, NewProduct, Product, ProductId, ProductPatch},
    services::activity::record_activity,
};

use super::MessageResponse;

fn not_found() -> AppError {
    AppError::NotFound("Cannot find product".to_string())
}

/// Lists the whole catalog
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.products.list().await?))
}

/// Fetches one product, logging a view for signed-in callers
pub async fn get_product(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    AppPath(id): AppPath<ProductId>,
) -> AppResult<Json<Product>> {
    let product = state.products.find_by_id(id).await?.ok_or_else(not_found)?;

    if let Some(auth) = auth {
        record_activity(state.activities.as_ref(), auth.user_id, id, ActivityKind::Viewed).await;
    }

    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(request): AppJson<NewProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    auth.require_admin()?;

    let product = request.into_product().map_err(AppError::Validation)?;
    state.products.insert(&product).await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<ProductId>,
    AppJson(patch): AppJson<ProductPatch>,
) -> AppResult<Json<Product>> {
    auth.require_admin()?;

    let mut product = state.products.find_by_id(id).await?.ok_or_else(not_found)?;
    product.apply(patch).map_err(AppError::Validation)?;

    if !state.products.update(&product).await? {
        return Err(not_found());
    }

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<ProductId>,
) -> AppResult<Json<MessageResponse>> {
    auth.require_admin()?;

    if !state.products.delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(MessageResponse::new("Deleted product")))
}
