///! Domain records shared between the backend modules
///!
///! Everything here crosses a cache, store, or HTTP boundary as JSON,
///! so all records derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};

/// Constellation id type (stable catalog key and cache sort score)
pub type ConstellId = u32;

/// A constellation record from the catalog collection.
///
/// `ra` is stored in hour units (the catalog convention); consumers
/// multiply by 15 to obtain degrees. Records are read-only to the
/// backend; the collection is maintained by the store administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub constell_id: ConstellId,
    pub name: String,
    pub ra: f64,
    pub dec: f64,
    /// Reference URL of the encyclopedia page for this constellation
    pub wiki: String,
}

impl CatalogEntry {
    /// Last path segment of the `wiki` reference, used as the external
    /// page title and as the content cache key.
    pub fn wiki_suffix(&self) -> &str {
        self.wiki.rsplit('/').next().unwrap_or(&self.wiki)
    }
}

/// A catalog entry paired with its computed horizontal coordinates.
///
/// Created fresh per visibility computation and discarded after the
/// response; azimuth/altitude are rounded to 3 fractional digits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub azimuth: f64,
    pub altitude: f64,
}

impl VisibleEntry {
    pub fn new(entry: CatalogEntry, azimuth: f64, altitude: f64) -> Self {
        Self { entry, azimuth, altitude }
    }
}

/// Resolved observation metadata for one visibility computation.
///
/// Longitude/latitude are the normalized 6-fractional-digit strings the
/// computation actually used; the sidereal chain (JD, GMST, LST) is
/// recorded alongside the civil inputs. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationContext {
    pub longitude: String,
    pub latitude: String,
    pub local_time: String,
    pub local_date: String,
    pub utc_time: String,
    pub julian_date: f64,
    pub gmst: f64,
    pub lst: f64,
}

/// Structured content scraped from a constellation's encyclopedia page.
///
/// Produced whole or not at all: a page whose markup does not match the
/// expected structure is a scrape failure, never a partial record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub shortdesc: String,
    pub symbolism: String,
    /// Bordering constellations as a pre-formatted `<ul><li>` fragment
    pub neighbours: String,
    pub visibility: String,
    pub flavor_text: String,
    /// Image reference for the constellation border chart
    pub border_img: String,
}

/// Scraped content merged with the owning catalog entry's identity,
/// the shape returned by the content endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub name: String,
    pub wiki: String,
    #[serde(flatten)]
    pub content: ScrapedContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> CatalogEntry {
        CatalogEntry {
            constell_id: 3,
            name: "Orion".to_string(),
            ra: 5.5,
            dec: 5.0,
            wiki: "https://en.wikipedia.org/wiki/Orion_(constellation)".to_string(),
        }
    }

    #[test]
    fn test_wiki_suffix() {
        assert_eq!(sample_entry().wiki_suffix(), "Orion_(constellation)");

        let bare = CatalogEntry {
            wiki: "Orion_(constellation)".to_string(),
            ..sample_entry()
        };
        assert_eq!(bare.wiki_suffix(), "Orion_(constellation)");
    }

    #[test]
    fn test_visible_entry_serializes_flat() {
        let visible = VisibleEntry::new(sample_entry(), 180.0, 40.123);
        let json = serde_json::to_value(&visible).unwrap();

        // Flattened: catalog fields sit beside azimuth/altitude
        assert_eq!(json["name"], "Orion");
        assert_eq!(json["constell_id"], 3);
        assert_eq!(json["azimuth"], 180.0);
        assert_eq!(json["altitude"], 40.123);
    }

    #[test]
    fn test_catalog_entry_roundtrip_keys() {
        let json = serde_json::to_string(&sample_entry()).unwrap();
        let back: CatalogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample_entry());
    }
}
