use std::sync::Arc;
use tracing::debug;

use crate::error::{PokedexError, Result};
use crate::model::{CacheKey, EntityDetail, EntityRef, identity_from_locator};
use crate::normalize::normalize;
use crate::persist::{KeyValueCache, recall, remember};
use crate::remote::Remote;

/// Resolves one entity, consulting the cache before the network.
#[derive(Clone)]
pub struct DetailFetcher {
    remote: Arc<dyn Remote>,
    cache: Arc<dyn KeyValueCache>,
}
impl DetailFetcher {
    pub fn new(remote: Arc<dyn Remote>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { remote, cache }
    }
    pub fn remote(&self) -> &Arc<dyn Remote> {
        &self.remote
    }
    pub fn cache(&self) -> &Arc<dyn KeyValueCache> {
        &self.cache
    }
    /// On a cache hit no request is made. On a miss exactly one request is
    /// made and the normalized detail is stored under `detail:<identity>`.
    pub async fn resolve(&self, entity: &EntityRef) -> Result<EntityDetail> {
        let identity = identity_from_locator(entity.locator()).ok_or_else(|| {
            PokedexError::malformed(format!("locator '{}' has no identity", entity.locator()))
        })?;
        let key = CacheKey::Detail(&identity);
        if let Some(detail) = recall::<EntityDetail>(self.cache.as_ref(), &key) {
            return Ok(detail);
        }
        debug!(%identity, "detail cache miss");
        let raw = self.remote.get_json(entity.locator()).await?;
        let detail = normalize(&raw)?;
        remember(self.cache.as_ref(), &key, &detail);
        Ok(detail)
    }
}
