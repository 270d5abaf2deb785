//! Time-bounded memoization of CMS responses, keyed by the full request URL.
//!
//! Entries older than the TTL are misses. Nothing is evicted proactively:
//! a stale entry simply sits in the map until the next `put` replaces it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Storage for fetched CMS payloads. Carried as `Arc<dyn ResponseCache>` so
/// the in-process map can be swapped for Redis without touching the client.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn put(&self, key: &str, data: Value);
    fn ttl(&self) -> Duration;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    stored_at: Instant,
}

/// Process-local cache. Uses tokio's clock so tests can pause and advance time.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.data.clone())
        } else {
            debug!("cache entry for {key} is stale");
            None
        }
    }

    async fn put(&self, key: &str, data: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Shared cache backed by Redis `SET ... EX`. Expiry is delegated to Redis.
///
/// One managed connection is opened on first use and shared by every call.
/// Each Redis round trip, connecting included, is bounded by `op_timeout`;
/// errors and timeouts degrade to a miss and never fail a fetch.
pub struct RedisCache {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    ttl: Duration,
    op_timeout: Duration,
}

const REDIS_KEY_PREFIX: &str = "folio:cms:";
pub const REDIS_OP_TIMEOUT: Duration = Duration::from_millis(500);

impl RedisCache {
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self {
            client,
            connection: OnceCell::new(),
            ttl,
            op_timeout: REDIS_OP_TIMEOUT,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    fn key(url: &str) -> String {
        format!("{REDIS_KEY_PREFIX}{url}")
    }

    async fn connection(&self) -> RedisResult<ConnectionManager> {
        self.connection
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await
            .cloned()
    }

    async fn bounded<T, F>(&self, op: &str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("Redis {op} failed for {key}: {e}");
                None
            }
            Err(_) => {
                warn!("Redis {op} timed out after {:?} for {key}", self.op_timeout);
                None
            }
        }
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let raw = self
            .bounded("GET", key, async {
                let mut conn = self.connection().await?;
                let raw: Option<String> = conn.get(Self::key(key)).await?;
                Ok(raw)
            })
            .await
            .flatten()?;
        serde_json::from_str(&raw).ok()
    }

    async fn put(&self, key: &str, data: Value) {
        let seconds = self.ttl.as_secs().max(1);
        self.bounded("SET", key, async {
            let mut conn = self.connection().await?;
            redis::cmd("SET")
                .arg(Self::key(key))
                .arg(data.to_string())
                .arg("EX")
                .arg(seconds)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await;
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
