use anyhow::{Result, anyhow};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::model::user::UserProfile;
use crate::store::UserStore;

const ACTIVE_USERS: &str = "active";

/// Caches the active user list shown on the selection screen and the
/// dashboard. The list changes rarely, so it is reloaded at most once per TTL.
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
    cache: Cache<&'static str, Arc<Vec<UserProfile>>>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserStore>, ttl: Duration) -> Self {
        Self {
            users,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Active users, ordered by last name then first name.
    pub async fn active_users(&self) -> Result<Arc<Vec<UserProfile>>> {
        let users = self.users.clone();

        self.cache
            .try_get_with(ACTIVE_USERS, async move {
                let list = users.list_active().await?;
                Ok::<_, anyhow::Error>(Arc::new(list))
            })
            .await
            .map_err(|e| anyhow!("failed to load active users: {e}"))
    }

    /// Drops the cached list so the next read goes to the store.
    pub async fn invalidate(&self) {
        self.cache.invalidate(ACTIVE_USERS).await;
    }

    /// Loads the list ahead of the first request.
    pub async fn warmup(&self) -> Result<()> {
        let users = self.active_users().await?;

        log::info!("User directory warmup complete: {} active users", users.len());

        Ok(())
    }
}
