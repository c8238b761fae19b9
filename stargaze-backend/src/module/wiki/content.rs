///! Content cache adapter: the fast tier fronting the scraper
use std::sync::Arc;

use stargaze_common::ScrapedContent;

use crate::error::SkyError;
use crate::module::catalog::FastTier;

use super::scraper::ContentScraper;

/// Scraped content keyed by the page's reference suffix. The fast
/// tier is authoritative while a record is present; the scraping
/// collaborator is authoritative on a miss. Nothing here is ever
/// written to the durable store.
pub struct ContentCache {
    tier: Arc<dyn FastTier>,
    scraper: Arc<dyn ContentScraper>,
    ttl_secs: u64,
}

impl ContentCache {
    pub fn new(tier: Arc<dyn FastTier>, scraper: Arc<dyn ContentScraper>, ttl_secs: u64) -> Self {
        Self { tier, scraper, ttl_secs }
    }

    /// Cached content for `cache_key`, scraping `page_url` on a miss.
    /// A hit re-arms the key's expiry; an unreachable tier degrades
    /// silently to scraping every time.
    pub async fn get_cached(
        &self,
        page_url: &str,
        cache_key: &str,
    ) -> Result<ScrapedContent, SkyError> {
        if let Some(raw) = self.tier.get(cache_key).await {
            match serde_json::from_str::<ScrapedContent>(&raw) {
                Ok(content) => {
                    self.tier.expire(cache_key, self.ttl_secs as i64).await;
                    tracing::debug!("Content cache hit for '{}'", cache_key);
                    return Ok(content);
                }
                Err(e) => {
                    tracing::warn!("Undecodable cached content for '{}': {}", cache_key, e);
                }
            }
        }

        let scraped = self.scraper.scrape(page_url).await?;
        if let Ok(raw) = serde_json::to_string(&scraped) {
            self.tier.set_px(cache_key, &raw, self.ttl_secs * 1000).await;
        }
        Ok(scraped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::catalog::{MemoryTier, RedisTier};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingScraper {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingScraper {
        fn new(fail: bool) -> Self {
            Self { calls: AtomicUsize::new(0), fail }
        }
    }

    fn sample_content() -> ScrapedContent {
        ScrapedContent {
            shortdesc: "Constellation on the celestial equator".to_string(),
            symbolism: "The Hunter".to_string(),
            neighbours: "<ul><li>Taurus</li><li>Lepus</li>".to_string(),
            visibility: "Visible between +85 and -75".to_string(),
            flavor_text: "Orion is a prominent constellation.".to_string(),
            border_img: "//upload.wikimedia.org/orion.png".to_string(),
        }
    }

    #[async_trait]
    impl ContentScraper for CountingScraper {
        async fn scrape(&self, _page_url: &str) -> Result<ScrapedContent, SkyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SkyError::ScrapeParse("markup mismatch".to_string()));
            }
            Ok(sample_content())
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit_scrapes_once() {
        let scraper = Arc::new(CountingScraper::new(false));
        let cache = ContentCache::new(Arc::new(MemoryTier::new()), scraper.clone(), 20);

        let first = cache.get_cached("http://page", "Orion_(constellation)").await.unwrap();
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 1);

        let second = cache.get_cached("http://page", "Orion_(constellation)").await.unwrap();
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_degraded_tier_scrapes_every_time() {
        let scraper = Arc::new(CountingScraper::new(false));
        let cache = ContentCache::new(Arc::new(RedisTier::offline()), scraper.clone(), 20);

        cache.get_cached("http://page", "Orion").await.unwrap();
        cache.get_cached("http://page", "Orion").await.unwrap();
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_scrape_failure_is_not_cached() {
        let scraper = Arc::new(CountingScraper::new(true));
        let tier = Arc::new(MemoryTier::new());
        let cache = ContentCache::new(tier.clone(), scraper.clone(), 20);

        assert!(cache.get_cached("http://page", "Orion").await.is_err());
        assert_eq!(tier.kv_len().await, 0);

        // The next call tries the collaborator again rather than
        // serving a poisoned record
        assert!(cache.get_cached("http://page", "Orion").await.is_err());
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 2);
    }
}
