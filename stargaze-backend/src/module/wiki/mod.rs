///! Encyclopedia content: scraping collaborator and its cache adapter

// ============ Scraper ============
mod scraper;
pub use self::scraper::{parse_api_url, ContentScraper, WikiScraper};

// ============ Cache Adapter ============
mod content;
pub use content::ContentCache;
