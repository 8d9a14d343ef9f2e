use std::collections::HashMap;

use tracing::instrument;

use crate::{
    db::{ActivityStore, ProductStore},
    error::{AppError, AppResult},
    models::{ActivityKind, ActivityRecord, Product, ProductId, UserId},
};

/// Upper bound on the number of products returned
pub const MAX_RECOMMENDATIONS: usize = 10;

const VIEWED_WEIGHT: u32 = 1;
const ADDED_TO_CART_WEIGHT: u32 = 3;
const PURCHASED_WEIGHT: u32 = 5;

/// How much a single activity says about a user's interest
///
/// Unrecognised actions count for nothing instead of failing the request.
pub fn activity_weight(kind: &ActivityKind) -> u32 {
    match kind {
        ActivityKind::Viewed => VIEWED_WEIGHT,
        ActivityKind::AddedToCart => ADDED_TO_CART_WEIGHT,
        ActivityKind::Purchased => PURCHASED_WEIGHT,
        ActivityKind::Unknown(_) => 0,
    }
}

/// Per-product score totals in the order each product was first seen
pub fn score_activities(activities: &[ActivityRecord]) -> Vec<(ProductId, u32)> {
    let mut positions: HashMap<ProductId, usize> = HashMap::new();
    let mut scores: Vec<(ProductId, u32)> = Vec::new();

    for activity in activities {
        let weight = activity_weight(&activity.action);
        let position = *positions.entry(activity.product_id).or_insert_with(|| {
            scores.push((activity.product_id, 0));
            scores.len() - 1
        });
        scores[position].1 = scores[position].1.saturating_add(weight);
    }

    scores
}

/// Product IDs ordered by descending score
///
/// The sort is stable, so equal scores keep first-seen order and repeated
/// calls over the same activity log always agree.
pub fn rank_products(activities: &[ActivityRecord]) -> Vec<ProductId> {
    let mut scores = score_activities(activities);
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    scores.into_iter().map(|(id, _)| id).collect()
}

/// Generates personalized product recommendations
///
/// Scores every product the user has interacted with (view 1, add to cart 3,
/// purchase 5), keeps the ten best and resolves them against the catalog.
/// Products deleted since the activity was logged are dropped without being
/// replaced, so fewer than ten results may come back.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn get_recommendations(
    activities: &dyn ActivityStore,
    products: &dyn ProductStore,
    user_id: UserId,
) -> AppResult<Vec<Product>> {
    let history = activities
        .find_by_user(user_id)
        .await
        .map_err(unavailable)?;

    if history.is_empty() {
        tracing::debug!("No activity recorded for user");
        return Ok(Vec::new());
    }

    let mut ranked = rank_products(&history);
    ranked.truncate(MAX_RECOMMENDATIONS);

    let found = products.find_by_ids(&ranked).await.map_err(unavailable)?;
    let recommendations = order_by_rank(&ranked, found);

    tracing::info!(
        activity_count = history.len(),
        candidate_count = ranked.len(),
        returned = recommendations.len(),
        "Recommendations computed"
    );

    Ok(recommendations)
}

/// Re-sorts resolved products to match the ranking; the store guarantees no order
fn order_by_rank(ranked: &[ProductId], found: Vec<Product>) -> Vec<Product> {
    let mut by_id: HashMap<ProductId, Product> = found.into_iter().map(|p| (p.id, p)).collect();
    ranked.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn unavailable(err: AppError) -> AppError {
    match err {
        AppError::RecommendationUnavailable(_) => err,
        other => AppError::RecommendationUnavailable(other.to_string()),
    }
}
