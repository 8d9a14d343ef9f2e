use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{to_column, to_quantity, PgStore};
use crate::{
    db::store::OrderStore,
    error::{AppError, AppResult},
    models::{LineItem, Order, OrderId, OrderStatus, ProductId, UserId},
};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    product_id: Uuid,
    quantity: i32,
    position: i32,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

impl PgStore {
    /// Loads the line items for a batch of order rows in one query
    async fn with_items(&self, rows: Vec<OrderRow>) -> AppResult<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT order_id, product_id, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.order_id).or_default().push(LineItem {
                product_id: ProductId(row.product_id),
                quantity: to_quantity(row.quantity),
            });
        }

        rows.into_iter()
            .map(|row| {
                let status = row
                    .status
                    .parse::<OrderStatus>()
                    .map_err(|e| AppError::Internal(format!("Corrupt order {}: {}", row.id, e)))?;
                Ok(Order {
                    id: OrderId(row.id),
                    user_id: UserId(row.user_id),
                    items: items.remove(&row.id).unwrap_or_default(),
                    status,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }
}

async fn insert_order(tx: &mut Transaction<'_, Postgres>, order: &Order) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, user_id, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.status.as_str())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut **tx)
    .await?;

    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, position, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order.id)
        .bind(position as i32)
        .bind(item.product_id)
        .bind(to_column(item.quantity)?)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl OrderStore for PgStore {
    async fn list(&self, user_id: Option<UserId>) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, status, created_at, updated_at
            FROM orders
            WHERE $1::uuid IS NULL OR user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(rows).await
    }

    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, status, created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert(&self, order: &Order) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_order(&mut tx, order).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn place_from_cart(&self, user_id: UserId) -> AppResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        // DELETE locks the rows, so a concurrent checkout finds nothing left
        let mut lines = sqlx::query_as::<_, CartLineRow>(
            r#"
            DELETE FROM cart_items
            WHERE user_id = $1
            RETURNING product_id, quantity, position
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Ok(None);
        }

        lines.sort_by_key(|line| line.position);
        let items = lines
            .into_iter()
            .map(|line| LineItem {
                product_id: ProductId(line.product_id),
                quantity: to_quantity(line.quantity),
            })
            .collect();

        let order = Order::new(user_id, items);
        insert_order(&mut tx, &order).await?;
        tx.commit().await?;

        Ok(Some(order))
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> AppResult<Option<Order>> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        OrderStore::find_by_id(self, id).await
    }

    async fn delete(&self, id: OrderId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
