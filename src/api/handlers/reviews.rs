use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    api::{AppJson, AppPath, AppState},
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{Product, ProductId, Review},
};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: f64,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub product: Product,
}

/// Adds the caller's review to a product
pub async fn add_review(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(product_id): AppPath<ProductId>,
    AppJson(request): AppJson<ReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let review =
        Review::new(auth.user_id, request.rating, &request.comment).map_err(AppError::InvalidInput)?;

    if state.users.find_by_id(auth.user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if !state.products.add_review(product_id, &review).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            message: "Review added successfully".to_string(),
            product,
        }),
    ))
}
