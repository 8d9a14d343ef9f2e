use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgStore;
use crate::{
    db::store::ActivityStore,
    error::AppResult,
    models::{ActivityId, ActivityKind, ActivityRecord, ProductId, UserId},
};

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    action: String,
    created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityRecord {
    fn from(row: ActivityRow) -> Self {
        ActivityRecord {
            id: ActivityId(row.id),
            user_id: UserId(row.user_id),
            product_id: ProductId(row.product_id),
            action: ActivityKind::from(row.action),
            timestamp: row.created_at,
        }
    }
}

#[async_trait]
impl ActivityStore for PgStore {
    async fn record(&self, activity: &ActivityRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_activities (id, user_id, product_id, action, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(activity.id)
        .bind(activity.user_id)
        .bind(activity.product_id)
        .bind(activity.action.as_str())
        .bind(activity.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ActivityRecord>> {
        // Oldest first so callers see activity in the order it happened
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, user_id, product_id, action, created_at
            FROM user_activities
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ActivityRecord::from).collect())
    }
}
