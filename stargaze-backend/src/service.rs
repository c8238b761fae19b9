///! Service operations and the HTTP surface
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use stargaze_common::{
    CatalogEntry, ConstellId, ContentRecord, ObservationContext, VisibleEntry,
};

use crate::error::SkyError;
use crate::module::astro::{current_time_date, resolve_observation, visible_entries};
use crate::module::catalog::CatalogManager;
use crate::module::wiki::{parse_api_url, ContentCache};

const WIKI_PAGE_BASE: &str = "https://en.wikipedia.org/wiki";

/// Core operations behind the HTTP surface: visibility computation,
/// catalog lookups through the two-tier cache, and content resolution
/// through the content cache adapter.
pub struct SkyService {
    catalog: CatalogManager,
    content: ContentCache,
}

impl SkyService {
    pub fn new(catalog: CatalogManager, content: ContentCache) -> Self {
        Self { catalog, content }
    }

    /// Which constellations are up for a location and civil instant,
    /// plus the resolved observation metadata.
    pub async fn compute_visibility(
        &self,
        longitude: &str,
        latitude: &str,
        local_time: &str,
        local_date: &str,
    ) -> Result<(Vec<VisibleEntry>, ObservationContext), SkyError> {
        let observation = resolve_observation(longitude, latitude, local_time, local_date)?;
        let catalog = self.catalog.list().await?;
        let visible = visible_entries(observation.latitude, observation.context.lst, &catalog);
        Ok((visible, observation.context))
    }

    pub async fn list_catalog(&self) -> Result<Vec<CatalogEntry>, SkyError> {
        self.catalog.list().await
    }

    pub async fn get_catalog_entry(
        &self,
        id: ConstellId,
    ) -> Result<Option<CatalogEntry>, SkyError> {
        self.catalog.get_by_id(id).await
    }

    /// Scraped content for an entry, merged with its name and wiki
    /// reference. Requires the entry to exist.
    pub async fn get_content(&self, id: ConstellId) -> Result<ContentRecord, SkyError> {
        let entry = self
            .catalog
            .get_by_id(id)
            .await?
            .ok_or(SkyError::NotFound(id))?;

        let suffix = entry.wiki_suffix().to_string();
        let page_url = parse_api_url(&suffix);
        let content = self.content.get_cached(&page_url, &suffix).await?;

        Ok(ContentRecord { name: entry.name, wiki: entry.wiki, content })
    }

    /// Canonical encyclopedia URL for an entry, for the redirect route.
    pub async fn wiki_url_for(&self, id: ConstellId) -> Result<String, SkyError> {
        let entry = self
            .catalog
            .get_by_id(id)
            .await?
            .ok_or(SkyError::NotFound(id))?;
        Ok(format!("{}/{}", WIKI_PAGE_BASE, entry.wiki_suffix()))
    }
}

/// Build the HTTP router over a shared service instance.
pub fn router(service: Arc<SkyService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/visible", get(visible))
        .route("/api/constellations", get(constellations))
        .route("/api/constellation", get(constellation))
        .route("/api/wiki", get(wiki_content))
        .route("/wiki/{constell_id}", get(wiki_redirect))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[derive(Debug, Deserialize)]
struct VisibleQuery {
    long: String,
    lat: String,
    time: Option<String>,
    date: Option<String>,
}

async fn visible(
    State(service): State<Arc<SkyService>>,
    Query(query): Query<VisibleQuery>,
) -> Response {
    let (date, time) = match (query.date, query.time) {
        (Some(date), Some(time)) => (date, time),
        // Callers may omit the instant and observe "now"
        _ => current_time_date(),
    };

    match service
        .compute_visibility(&query.long, &query.lat, &time, &date)
        .await
    {
        Ok((visible, observation)) => Json(json!({
            "how_many": visible.len(),
            "visible": visible,
            "observation": observation,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn constellations(State(service): State<Arc<SkyService>>) -> Response {
    match service.list_catalog().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    constell_id: String,
}

fn parse_id(raw: &str) -> Result<ConstellId, SkyError> {
    raw.parse().map_err(|_| SkyError::InvalidId(raw.to_string()))
}

async fn constellation(
    State(service): State<Arc<SkyService>>,
    Query(query): Query<IdQuery>,
) -> Response {
    let id = match parse_id(&query.constell_id) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };
    match service.get_catalog_entry(id).await {
        Ok(Some(entry)) => Json(entry).into_response(),
        Ok(None) => error_response(SkyError::NotFound(id)),
        Err(e) => error_response(e),
    }
}

async fn wiki_content(
    State(service): State<Arc<SkyService>>,
    Query(query): Query<IdQuery>,
) -> Response {
    let id = match parse_id(&query.constell_id) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };
    match service.get_content(id).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

async fn wiki_redirect(
    State(service): State<Arc<SkyService>>,
    Path(constell_id): Path<String>,
) -> Response {
    let id = match parse_id(&constell_id) {
        Ok(id) => id,
        Err(e) => return error_response(e),
    };
    match service.wiki_url_for(id).await {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: SkyError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if matches!(err, SkyError::NotFound(_)) {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_GATEWAY
    };

    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::catalog::{JsonCatalogStore, MemoryTier};
    use crate::module::wiki::ContentScraper;
    use async_trait::async_trait;
    use stargaze_common::ScrapedContent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubScraper {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentScraper for StubScraper {
        async fn scrape(&self, _page_url: &str) -> Result<ScrapedContent, SkyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ScrapedContent {
                shortdesc: "A constellation".to_string(),
                symbolism: "The Hunter".to_string(),
                neighbours: "<ul><li>Taurus</li>".to_string(),
                visibility: "Everywhere".to_string(),
                flavor_text: "Bright stars.".to_string(),
                border_img: "//img/orion.png".to_string(),
            })
        }
    }

    fn sample_catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                constell_id: 1,
                name: "Orion".to_string(),
                ra: 5.0,
                dec: -5.0,
                wiki: "https://en.wikipedia.org/wiki/Orion_(constellation)".to_string(),
            },
            CatalogEntry {
                constell_id: 2,
                name: "Crux".to_string(),
                ra: 12.5,
                dec: -60.0,
                wiki: "https://en.wikipedia.org/wiki/Crux".to_string(),
            },
        ]
    }

    fn service_with(scraper: Arc<StubScraper>) -> SkyService {
        let tier = Arc::new(MemoryTier::new());
        let store = Arc::new(JsonCatalogStore::from_entries(sample_catalog()));
        SkyService::new(
            CatalogManager::new(store, tier.clone(), 20),
            ContentCache::new(tier, scraper, 20),
        )
    }

    #[tokio::test]
    async fn test_compute_visibility_end_to_end() {
        let service = service_with(Arc::new(StubScraper { calls: AtomicUsize::new(0) }));

        // Northern midlatitudes: Crux (dec -60) can never rise
        let (visible, observation) = service
            .compute_visibility("0.0", "45.0", "12:00:00", "2000-01-01")
            .await
            .unwrap();

        assert_eq!(observation.longitude, "0.000000");
        assert!((observation.julian_date - 2_451_545.0).abs() < 1e-9);
        assert!(visible.iter().all(|v| v.entry.constell_id != 2));
        assert!(visible.iter().all(|v| v.altitude > 0.0 && v.azimuth > 0.0));
    }

    #[tokio::test]
    async fn test_compute_visibility_malformed_input() {
        let service = service_with(Arc::new(StubScraper { calls: AtomicUsize::new(0) }));
        let result = service
            .compute_visibility("not-a-number", "45.0", "12:00:00", "2000-01-01")
            .await;
        assert!(matches!(result, Err(SkyError::InvalidCoordinate(_))));
    }

    #[tokio::test]
    async fn test_get_content_merges_entry_identity() {
        let scraper = Arc::new(StubScraper { calls: AtomicUsize::new(0) });
        let service = service_with(scraper.clone());

        let record = service.get_content(1).await.unwrap();
        assert_eq!(record.name, "Orion");
        assert_eq!(record.wiki, "https://en.wikipedia.org/wiki/Orion_(constellation)");
        assert_eq!(record.content.symbolism, "The Hunter");
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 1);

        // Second request inside the TTL window is served from cache
        service.get_content(1).await.unwrap();
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_content_unknown_id() {
        let service = service_with(Arc::new(StubScraper { calls: AtomicUsize::new(0) }));
        assert!(matches!(service.get_content(99).await, Err(SkyError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_wiki_url_for_entry() {
        let service = service_with(Arc::new(StubScraper { calls: AtomicUsize::new(0) }));
        let url = service.wiki_url_for(1).await.unwrap();
        assert_eq!(url, "https://en.wikipedia.org/wiki/Orion_(constellation)");
    }
}
