use crate::{
    db::ActivityStore,
    models::{ActivityKind, ActivityRecord, ProductId, UserId},
};

/// Appends an activity record for the user
///
/// Recording is best effort: a store failure is logged and never surfaces to
/// the request that triggered it.
pub async fn record_activity(
    store: &dyn ActivityStore,
    user_id: UserId,
    product_id: ProductId,
    action: ActivityKind,
) {
    let activity = ActivityRecord::new(user_id, product_id, action);

    match store.record(&activity).await {
        Ok(()) => tracing::debug!(
            user_id = %user_id,
            product_id = %product_id,
            action = %activity.action,
            "User activity recorded"
        ),
        Err(e) => tracing::warn!(
            user_id = %user_id,
            product_id = %product_id,
            action = %activity.action,
            error = %e,
            "Failed to record user activity"
        ),
    }
}
