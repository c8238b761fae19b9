///! Fast-tier cache provider
///!
///! The volatile tier is a shared external resource and never the
///! source of truth: every method is total, turning unavailability and
///! per-call failures into misses/no-ops with a warning, so callers
///! fall through to the durable store instead of failing.
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

#[async_trait]
pub trait FastTier: Send + Sync {
    /// Plain key/value lookup. `None` on miss or tier unavailability.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value under `key` with a millisecond time-to-live.
    async fn set_px(&self, key: &str, value: &str, ttl_ms: u64);

    /// Members of the sorted set at `key` whose score is exactly
    /// `score`. `None` when the tier is unreachable.
    async fn range_by_score(&self, key: &str, score: f64) -> Option<Vec<String>>;

    /// The whole sorted set at `key` with scores, ascending. `None`
    /// when the tier is unreachable.
    async fn range_all_with_scores(&self, key: &str) -> Option<Vec<(String, f64)>>;

    /// Add scored members to the sorted set at `key`.
    async fn zadd_multi(&self, key: &str, members: &[(f64, String)]);

    /// Re-arm the expiry on `key`.
    async fn expire(&self, key: &str, ttl_secs: i64);

    /// Whether the provider held a live connection at construction.
    fn is_available(&self) -> bool;
}

/// Redis-backed fast tier with a connect-once lifecycle: one liveness
/// probe at startup, the multiplexed connection reused afterwards.
/// Construction failure yields the degraded (unavailable) provider,
/// which is a valid state, not an error.
#[derive(Clone)]
pub struct RedisTier {
    conn: Option<MultiplexedConnection>,
}

impl RedisTier {
    pub async fn connect(url: &str) -> Self {
        match Self::try_connect(url).await {
            Ok(conn) => {
                tracing::info!("Fast tier connected at {}", url);
                Self { conn: Some(conn) }
            }
            Err(e) => {
                tracing::warn!(
                    "Unable to reach the fast tier at {}, working with the durable store exclusively: {}",
                    url,
                    e
                );
                Self { conn: None }
            }
        }
    }

    async fn try_connect(url: &str) -> redis::RedisResult<MultiplexedConnection> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(conn)
    }

    /// The permanently degraded provider.
    pub fn offline() -> Self {
        Self { conn: None }
    }
}

#[async_trait]
impl FastTier for RedisTier {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone()?;
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;
        match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Fast tier GET {} failed: {}", key, e);
                None
            }
        }
    }

    async fn set_px(&self, key: &str, value: &str, ttl_ms: u64) {
        let Some(mut conn) = self.conn.clone() else { return };
        let result: redis::RedisResult<()> = conn.pset_ex(key, value, ttl_ms).await;
        if let Err(e) = result {
            tracing::warn!("Fast tier PSETEX {} failed: {}", key, e);
        }
    }

    async fn range_by_score(&self, key: &str, score: f64) -> Option<Vec<String>> {
        let mut conn = self.conn.clone()?;
        let result: redis::RedisResult<Vec<String>> =
            conn.zrangebyscore(key, score, score).await;
        match result {
            Ok(members) => Some(members),
            Err(e) => {
                tracing::warn!("Fast tier ZRANGEBYSCORE {} failed: {}", key, e);
                None
            }
        }
    }

    async fn range_all_with_scores(&self, key: &str) -> Option<Vec<(String, f64)>> {
        let mut conn = self.conn.clone()?;
        let result: redis::RedisResult<Vec<(String, f64)>> =
            conn.zrange_withscores(key, 0, -1).await;
        match result {
            Ok(members) => Some(members),
            Err(e) => {
                tracing::warn!("Fast tier ZRANGE {} failed: {}", key, e);
                None
            }
        }
    }

    async fn zadd_multi(&self, key: &str, members: &[(f64, String)]) {
        let Some(mut conn) = self.conn.clone() else { return };
        let result: redis::RedisResult<()> = conn.zadd_multiple(key, members).await;
        if let Err(e) = result {
            tracing::warn!("Fast tier ZADD {} failed: {}", key, e);
        }
    }

    async fn expire(&self, key: &str, ttl_secs: i64) {
        let Some(mut conn) = self.conn.clone() else { return };
        let result: redis::RedisResult<()> = conn.expire(key, ttl_secs).await;
        if let Err(e) = result {
            tracing::warn!("Fast tier EXPIRE {} failed: {}", key, e);
        }
    }

    fn is_available(&self) -> bool {
        self.conn.is_some()
    }
}

/// In-memory tier used by the cache tests: live, never expires, and
/// counts expiry re-arms.
#[cfg(test)]
pub struct MemoryTier {
    kv: tokio::sync::Mutex<std::collections::HashMap<String, String>>,
    zsets: tokio::sync::Mutex<std::collections::HashMap<String, Vec<(f64, String)>>>,
    pub expire_calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryTier {
    pub fn new() -> Self {
        Self {
            kv: tokio::sync::Mutex::new(std::collections::HashMap::new()),
            zsets: tokio::sync::Mutex::new(std::collections::HashMap::new()),
            expire_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub async fn zset_len(&self, key: &str) -> usize {
        self.zsets.lock().await.get(key).map_or(0, Vec::len)
    }

    pub async fn kv_len(&self) -> usize {
        self.kv.lock().await.len()
    }
}

#[cfg(test)]
#[async_trait]
impl FastTier for MemoryTier {
    async fn get(&self, key: &str) -> Option<String> {
        self.kv.lock().await.get(key).cloned()
    }

    async fn set_px(&self, key: &str, value: &str, _ttl_ms: u64) {
        self.kv.lock().await.insert(key.to_string(), value.to_string());
    }

    async fn range_by_score(&self, key: &str, score: f64) -> Option<Vec<String>> {
        let zsets = self.zsets.lock().await;
        Some(
            zsets
                .get(key)
                .map(|members| {
                    members
                        .iter()
                        .filter(|(s, _)| *s == score)
                        .map(|(_, m)| m.clone())
                        .collect()
                })
                .unwrap_or_default(),
        )
    }

    async fn range_all_with_scores(&self, key: &str) -> Option<Vec<(String, f64)>> {
        let zsets = self.zsets.lock().await;
        let mut members: Vec<(String, f64)> = zsets
            .get(key)
            .map(|ms| ms.iter().map(|(s, m)| (m.clone(), *s)).collect())
            .unwrap_or_default();
        members.sort_by(|a, b| a.1.total_cmp(&b.1));
        Some(members)
    }

    async fn zadd_multi(&self, key: &str, members: &[(f64, String)]) {
        let mut zsets = self.zsets.lock().await;
        let set = zsets.entry(key.to_string()).or_default();
        for (score, member) in members {
            if let Some(existing) = set.iter_mut().find(|(_, m)| m == member) {
                existing.0 = *score;
            } else {
                set.push((*score, member.clone()));
            }
        }
    }

    async fn expire(&self, _key: &str, _ttl_secs: i64) {
        self.expire_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn is_available(&self) -> bool {
        true
    }
}
