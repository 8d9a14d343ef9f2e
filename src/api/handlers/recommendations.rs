use axum::{extract::State, Extension, Json};

use crate::{
    api::AppState,
    error::AppResult,
    middleware::{AuthUser, RequestId},
    models::Product,
    services::recommendations,
};

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Product>>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %auth.user_id,
        "Processing recommendation request"
    );

    let products = recommendations::get_recommendations(
        state.activities.as_ref(),
        state.products.as_ref(),
        auth.user_id,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        count = products.len(),
        "Recommendations returned"
    );

    Ok(Json(products))
}
