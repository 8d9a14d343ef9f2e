use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{to_column, to_quantity, PgStore};
use crate::{
    db::store::ProductStore,
    error::AppResult,
    models::{Product, ProductId, Review, UserId},
};

const PRODUCT_COLUMNS: &str = "id, name, price, description, image_url, quantity, category";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: f64,
    description: String,
    image_url: String,
    quantity: i32,
    category: String,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    product_id: Uuid,
    user_id: Uuid,
    rating: f64,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            user_id: UserId(row.user_id),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

impl PgStore {
    /// Loads the reviews for a batch of product rows in one query
    async fn with_reviews(&self, rows: Vec<ProductRow>) -> AppResult<Vec<Product>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let review_rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT product_id, user_id, rating, comment, created_at
            FROM product_reviews
            WHERE product_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut reviews: HashMap<Uuid, Vec<Review>> = HashMap::new();
        for row in review_rows {
            reviews.entry(row.product_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| Product {
                id: ProductId(row.id),
                reviews: reviews.remove(&row.id).unwrap_or_default(),
                name: row.name,
                price: row.price,
                description: row.description,
                image_url: row.image_url,
                quantity: to_quantity(row.quantity),
                category: row.category,
            })
            .collect())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_reviews(rows).await
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_reviews(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> AppResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        self.with_reviews(rows).await
    }

    async fn insert(&self, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, description, image_url, quantity, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(to_column(product.quantity)?)
        .bind(&product.category)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, price = $3, description = $4, image_url = $5, quantity = $6, category = $7
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(to_column(product.quantity)?)
        .bind(&product.category)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ProductId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_review(&self, id: ProductId, review: &Review) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO product_reviews (product_id, user_id, rating, comment, created_at)
            SELECT id, $2, $3, $4, $5 FROM products WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
