///! Two-tier read-through cache over the catalog
use std::sync::Arc;

use stargaze_common::{CatalogEntry, ConstellId};

use crate::error::SkyError;

use super::store::CatalogStore;
use super::tier::FastTier;

/// Sorted-set key holding the serialized catalog, scored by id
const CATALOG_SET_KEY: &str = "constellations";

/// Read paths over the catalog: fast tier first, durable store as the
/// fallback of record, with write-back population and refresh-on-read
/// expiry. The durable store is never written here.
pub struct CatalogManager {
    store: Arc<dyn CatalogStore>,
    tier: Arc<dyn FastTier>,
    ttl_secs: i64,
}

impl CatalogManager {
    pub fn new(store: Arc<dyn CatalogStore>, tier: Arc<dyn FastTier>, ttl_secs: u64) -> Self {
        Self { store, tier, ttl_secs: ttl_secs as i64 }
    }

    /// Resolve one entry by id. A miss in both tiers is `Ok(None)`;
    /// absent records are never populated into the fast tier.
    pub async fn get_by_id(&self, id: ConstellId) -> Result<Option<CatalogEntry>, SkyError> {
        let Some(hits) = self.tier.range_by_score(CATALOG_SET_KEY, id as f64).await else {
            // Degraded mode: durable store only for this call
            return Ok(self.store.find_by_id(id).await?);
        };

        if let Some(raw) = hits.first() {
            match serde_json::from_str::<CatalogEntry>(raw) {
                Ok(entry) => {
                    self.tier.expire(CATALOG_SET_KEY, self.ttl_secs).await;
                    return Ok(Some(entry));
                }
                Err(e) => {
                    tracing::warn!("Undecodable cached member for id {}: {}", id, e);
                }
            }
        }

        let found = self.store.find_by_id(id).await?;
        if let Some(entry) = &found {
            self.populate(std::slice::from_ref(entry)).await;
        }
        self.tier.expire(CATALOG_SET_KEY, self.ttl_secs).await;
        Ok(found)
    }

    /// The full catalog: fast-tier contents plus the durable-store
    /// complement, which is written back on the way out. The union is
    /// sorted by id only when the fast tier contributed entries;
    /// otherwise durable-store order is preserved as-is.
    pub async fn list(&self) -> Result<Vec<CatalogEntry>, SkyError> {
        let cached = self.tier.range_all_with_scores(CATALOG_SET_KEY).await;
        let tier_live = cached.is_some();

        let mut cached_entries: Vec<CatalogEntry> = Vec::new();
        let mut cached_ids: Vec<ConstellId> = Vec::new();
        if let Some(members) = &cached {
            for (raw, score) in members {
                match serde_json::from_str::<CatalogEntry>(raw) {
                    Ok(entry) => {
                        cached_entries.push(entry);
                        cached_ids.push(*score as ConstellId);
                    }
                    Err(e) => {
                        tracing::warn!("Undecodable cached member (score {}): {}", score, e);
                    }
                }
            }
            if !members.is_empty() {
                self.tier.expire(CATALOG_SET_KEY, self.ttl_secs).await;
            }
        }
        let had_cache_hits = !cached_entries.is_empty();

        let fresh = self.store.find_not_in(&cached_ids).await?;
        if tier_live && !fresh.is_empty() {
            self.populate(&fresh).await;
            self.tier.expire(CATALOG_SET_KEY, self.ttl_secs).await;
        }

        let mut all = fresh;
        all.extend(cached_entries);
        if had_cache_hits {
            all.sort_by_key(|e| e.constell_id);
        }
        Ok(all)
    }

    async fn populate(&self, entries: &[CatalogEntry]) {
        let members: Vec<(f64, String)> = entries
            .iter()
            .filter_map(|entry| {
                serde_json::to_string(entry)
                    .map(|raw| (entry.constell_id as f64, raw))
                    .map_err(|e| {
                        tracing::warn!(
                            "Skipping cache population for id {}: {}",
                            entry.constell_id,
                            e
                        )
                    })
                    .ok()
            })
            .collect();

        if !members.is_empty() {
            self.tier.zadd_multi(CATALOG_SET_KEY, &members).await;
        }
    }
}
