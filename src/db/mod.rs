pub mod cached;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use cached::CachedProductStore;
pub use memory::InMemoryStore;
pub use postgres::{create_pool, PgStore};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle, VersionedKey};
pub use store::{ActivityStore, CartStore, OrderStore, ProductStore, UserStore};
