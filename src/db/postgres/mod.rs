use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::{AppError, AppResult},
    models::MAX_QUANTITY,
};

mod activities;
mod carts;
mod orders;
mod products;
mod users;

/// Creates a PostgreSQL connection pool and applies pending migrations
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Postgres-backed implementation of every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Converts a stored count back to the unsigned model type
fn to_quantity(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Converts a model count to the signed column type
///
/// Counts are validated against `MAX_QUANTITY` before they get here, so an
/// out-of-range value is rejected rather than clamped.
fn to_column(value: u32) -> AppResult<i32> {
    i32::try_from(value)
        .map_err(|_| AppError::InvalidInput(format!("Quantity must be at most {}", MAX_QUANTITY)))
}
