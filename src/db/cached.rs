use std::sync::Arc;

use async_trait::async_trait;

use super::{
    redis::{Cache, CacheKey},
    store::ProductStore,
};
use crate::{
    cached,
    error::AppResult,
    models::{Product, ProductId, Review},
};

const CATALOG_CACHE_TTL: u64 = 300; // 5 minutes
const PRODUCT_CACHE_TTL: u64 = 3600; // 1 hour

/// Product store decorator that serves reads from Redis
///
/// Every write goes to the wrapped store first and then invalidates the
/// affected keys, which orphans any fill still queued from an earlier read.
/// Batch lookups for recommendations bypass the cache.
pub struct CachedProductStore {
    inner: Arc<dyn ProductStore>,
    cache: Cache,
}

impl CachedProductStore {
    pub fn new(inner: Arc<dyn ProductStore>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl ProductStore for CachedProductStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        cached!(self.cache, CacheKey::Catalog, CATALOG_CACHE_TTL, self.inner.list())
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        let key = self.cache.current(&CacheKey::Product(id)).await?;
        if let Some(product) = self.cache.get_from_cache::<Product>(&key).await? {
            return Ok(Some(product));
        }

        // Misses are not cached so a newly created product is visible at once
        let product = self.inner.find_by_id(id).await?;
        if let Some(product) = &product {
            self.cache.set_in_background(&key, product, PRODUCT_CACHE_TTL);
        }
        Ok(product)
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> AppResult<Vec<Product>> {
        self.inner.find_by_ids(ids).await
    }

    async fn insert(&self, product: &Product) -> AppResult<()> {
        self.inner.insert(product).await?;
        self.cache.invalidate(&[CacheKey::Catalog]).await
    }

    async fn update(&self, product: &Product) -> AppResult<bool> {
        let updated = self.inner.update(product).await?;
        self.cache
            .invalidate(&[CacheKey::Catalog, CacheKey::Product(product.id)])
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> AppResult<bool> {
        let deleted = self.inner.delete(id).await?;
        self.cache
            .invalidate(&[CacheKey::Catalog, CacheKey::Product(id)])
            .await?;
        Ok(deleted)
    }

    async fn add_review(&self, id: ProductId, review: &Review) -> AppResult<bool> {
        let added = self.inner.add_review(id, review).await?;
        self.cache
            .invalidate(&[CacheKey::Catalog, CacheKey::Product(id)])
            .await?;
        Ok(added)
    }
}
