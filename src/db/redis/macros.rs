/// Read-through caching against a `Cache`.
///
/// Pins `$key` to its current generation, then returns the cached value when
/// present. Otherwise awaits `$block`, queues the result for storage under the
/// pinned generation with the given TTL (seconds) and returns it.
/// Errors from either the cache read or the block propagate with `?`, so the
/// macro must be used inside a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Catalog, CATALOG_TTL, self.inner.list())
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $cache.current(&$key).await?;
        if let Some(cached) = $cache.get_from_cache(&key).await? {
            tracing::debug!(key = %key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
