use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The full product listing
    Catalog,
    /// A single product with its reviews
    Product(ProductId),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Catalog => write!(f, "catalog"),
            CacheKey::Product(id) => write!(f, "product:{}", id),
        }
    }
}

impl CacheKey {
    /// Counter bumped on every invalidation of this key
    fn generation_key(&self) -> String {
        format!("{}:gen", self)
    }

    /// The Redis key holding this entry's value for one generation
    pub fn versioned(&self, generation: u64) -> VersionedKey {
        VersionedKey(format!("{}:v{}", self, generation))
    }
}

/// A cache key pinned to the generation that was current when it was resolved
///
/// Values are read and written under this key only. Invalidation moves the
/// logical key to a new generation, so a write queued against an older one is
/// never served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedKey(String);

impl Display for VersionedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until it has flushed pending writes
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// Writes are queued on a channel and applied by the background task so
    /// cache population never delays a response.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown, drains whatever is already queued before exiting.
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Senders live in every Cache clone, so drain without waiting for close
                    let mut flushed = 0usize;
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                        flushed += 1;
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Writes a single message to Redis
    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Resolves a key to its current generation
    ///
    /// Must be called before reading the backing store, so that a write which
    /// commits in between invalidates the generation this read will fill.
    pub async fn current(&self, key: &CacheKey) -> AppResult<VersionedKey> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let generation: Option<u64> = conn.get(key.generation_key()).await?;
        Ok(key.versioned(generation.unwrap_or(0)))
    }

    /// Retrieves and deserializes a value, or `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &VersionedKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(&key.0).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for storage without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &VersionedKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.0.clone(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }

    /// Moves keys to a new generation so the next read goes to the store
    ///
    /// Call after the backing store has committed. Entries for older
    /// generations are left to expire with their TTL.
    pub async fn invalidate(&self, keys: &[CacheKey]) -> AppResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.incr(key.generation_key(), 1u64).ignore();
        }

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = pipe.atomic().query_async(&mut conn).await?;

        tracing::debug!(keys = ?keys, "Invalidated cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[test]
    fn test_cache_key_display_catalog() {
        assert_eq!(CacheKey::Catalog.to_string(), "catalog");
    }

    #[test]
    fn test_versioned_key_includes_generation() {
        assert_eq!(CacheKey::Catalog.versioned(0).to_string(), "catalog:v0");
        assert_ne!(CacheKey::Catalog.versioned(1), CacheKey::Catalog.versioned(2));
        assert_eq!(CacheKey::Catalog.generation_key(), "catalog:gen");
    }

    #[test]
    fn test_cache_key_display_product() {
        let id: ProductId = "6f1c1a3e-7a44-4b7e-9a53-5c1d0f3b2a10".parse().unwrap();
        assert_eq!(
            CacheKey::Product(id).to_string(),
            "product:6f1c1a3e-7a44-4b7e-9a53-5c1d0f3b2a10"
        );
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_cache_miss() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client);

        let key = cache.current(&CacheKey::Product(ProductId::new())).await.unwrap();
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_set_in_background_then_invalidate() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = Cache::new(client);

        let logical = CacheKey::Product(ProductId::new());
        let key = cache.current(&logical).await.unwrap();
        let value = vec!["lamp".to_string()];
        cache.set_in_background(&key, &value, 60);

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        cache.invalidate(&[logical.clone()]).await.unwrap();
        let key = cache.current(&logical).await.unwrap();
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_shutdown_flushes_queued_writes() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::new(client);

        let logical = CacheKey::Product(ProductId::new());
        let key = cache.current(&logical).await.unwrap();
        let value = vec!["queued".to_string()];
        cache.set_in_background(&key, &value, 60);

        handle.shutdown().await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));
        cache.invalidate(&[logical]).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_fill_queued_before_invalidation_is_never_served() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = Cache::new(client);
        let logical = CacheKey::Product(ProductId::new());

        // A reader misses and loads the old value from the store
        let reader_key = cache.current(&logical).await.unwrap();
        // A writer commits and invalidates before the reader's fill lands
        cache.invalidate(&[logical.clone()]).await.unwrap();
        cache.set_in_background(&reader_key, &"old".to_string(), 60);
        handle.shutdown().await;

        let key = cache.current(&logical).await.unwrap();
        let retrieved: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);
    }
}
