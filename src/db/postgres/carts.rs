use async_trait::async_trait;
use uuid::Uuid;

use super::{to_column, to_quantity, PgStore};
use crate::{
    db::store::CartStore,
    error::AppResult,
    models::{Cart, LineItem, ProductId, UserId},
};

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: Uuid,
    quantity: i32,
}

#[async_trait]
impl CartStore for PgStore {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Cart>> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT product_id, quantity FROM cart_items WHERE user_id = $1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(Cart {
            user_id,
            items: rows
                .into_iter()
                .map(|row| LineItem {
                    product_id: ProductId(row.product_id),
                    quantity: to_quantity(row.quantity),
                })
                .collect(),
        }))
    }

    async fn save(&self, cart: &Cart) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(cart.user_id)
            .execute(&mut *tx)
            .await?;

        for (position, item) in cart.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (user_id, product_id, quantity, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(cart.user_id)
            .bind(item.product_id)
            .bind(to_column(item.quantity)?)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
