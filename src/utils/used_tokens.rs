use moka::future::Cache;
use std::time::Duration;

/// Clock tokens are good for a single punch. The `jti` of every spent or
/// cleared token is kept until the token would have expired anyway.
pub struct UsedTokens {
    cache: Cache<String, ()>,
}

impl UsedTokens {
    /// `ttl` must cover the token lifetime plus the validation leeway.
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Marks the token as spent. Returns false when it was already spent.
    pub async fn consume(&self, jti: &str) -> bool {
        self.cache
            .entry(jti.to_string())
            .or_insert(())
            .await
            .is_fresh()
    }

    pub fn is_used(&self, jti: &str) -> bool {
        self.cache.contains_key(jti)
    }

    /// Spends the token without using it.
    pub async fn revoke(&self, jti: &str) {
        self.cache.insert(jti.to_string(), ()).await;
    }
}
