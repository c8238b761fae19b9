///! Wikipedia scraper for constellation pages
///!
///! Fetches rendered page HTML through the MediaWiki parse API and
///! walks it into a structured record. All the markup handling lives
///! here; the rest of the backend only ever sees `ScrapedContent`.
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;

use stargaze_common::ScrapedContent;

use crate::error::SkyError;

const WIKI_API_BASE: &str = "https://en.wikipedia.org/w/api.php";
const WIKI_ORIGIN: &str = "https://en.wikipedia.org";

/// Flavor text is cut at the first space inside this byte window
const FLAVOR_CUT_FROM: usize = 290;
const FLAVOR_CUT_TO: usize = 320;

/// MediaWiki parse-API URL for a page title.
pub fn parse_api_url(page_title: &str) -> String {
    format!(
        "{}?action=parse&page={}&format=json",
        WIKI_API_BASE,
        urlencoding::encode(page_title)
    )
}

/// Produces a structured record from an encyclopedia page reference.
#[async_trait]
pub trait ContentScraper: Send + Sync {
    async fn scrape(&self, page_url: &str) -> Result<ScrapedContent, SkyError>;
}

/// Scraper backed by the live MediaWiki API.
pub struct WikiScraper {
    client: reqwest::Client,
}

impl WikiScraper {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .user_agent("stargaze-backend/0.1")
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetch the parse-API envelope and pull out the rendered HTML.
    async fn fetch_rendered_html(&self, page_url: &str) -> Result<String, SkyError> {
        tracing::debug!("Fetching rendered page from {}", page_url);

        let data: serde_json::Value = self
            .client
            .get(page_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        data["parse"]["text"]["*"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                SkyError::ScrapeParse("content API envelope is missing parse.text".to_string())
            })
    }

    /// Second fetch: resolve the border-chart thumbnail link into the
    /// full image source on the file description page.
    async fn resolve_border_image(&self, image_href: &str) -> Result<String, SkyError> {
        let url = format!("{}{}", WIKI_ORIGIN, image_href);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let doc = Html::parse_document(&body);
        let link = first_element(&doc, "div.fullImageLink")?;
        let img = link
            .select(&selector("img")?)
            .next()
            .ok_or_else(|| missing("div.fullImageLink img"))?;
        img.value()
            .attr("src")
            .map(str::to_string)
            .ok_or_else(|| missing("fullImageLink img src"))
    }
}

#[async_trait]
impl ContentScraper for WikiScraper {
    async fn scrape(&self, page_url: &str) -> Result<ScrapedContent, SkyError> {
        let html = self.fetch_rendered_html(page_url).await?;
        let page = parse_page(&html)?;
        let border_img = self.resolve_border_image(&page.image_href).await?;

        tracing::info!("Scraped constellation page from {}", page_url);
        Ok(ScrapedContent {
            shortdesc: page.shortdesc,
            symbolism: page.symbolism,
            neighbours: page.neighbours,
            visibility: page.visibility,
            flavor_text: page.flavor_text,
            border_img,
        })
    }
}

/// Everything extractable from the article HTML in one pass; the
/// border image still needs the follow-up fetch.
struct ParsedPage {
    shortdesc: String,
    symbolism: String,
    neighbours: String,
    visibility: String,
    flavor_text: String,
    image_href: String,
}

/// Walk the rendered article HTML. Any missing structural element is
/// a scrape failure: partial records would poison the cache for a
/// full TTL window.
fn parse_page(html: &str) -> Result<ParsedPage, SkyError> {
    let doc = Html::parse_document(html);

    let shortdesc = element_text(&first_element(&doc, "div.shortdescription")?);

    // Label cell -> sibling data cell, with citation markers dropped
    let symbolism_cell = infobox_value(&doc, "Symbolism")?;
    let symbolism = title_case(
        element_text(&symbolism_cell)
            .split('[')
            .next()
            .unwrap_or_default(),
    );

    let visibility = element_text(&first_element(&doc, "td.infobox-below")?);

    let flavor_text = flavor_text(&doc)?;

    let neighbours_cell = infobox_value(&doc, "Bordering")?;
    let mut neighbours = String::from("<ul>");
    for link in neighbours_cell.select(&selector("a[href]")?) {
        let href = link.value().attr("href").unwrap_or_default();
        if href.starts_with("#cite") {
            continue;
        }
        neighbours.push_str(&format!("<li>{}</li>", element_text(&link)));
    }

    let image_box = first_element(&doc, ".infobox-image")?;
    let img = image_box
        .select(&selector("img")?)
        .next()
        .ok_or_else(|| missing("infobox image"))?;
    let image_href = img
        .parent()
        .and_then(|parent| parent.value().as_element())
        .and_then(|parent| parent.attr("href"))
        .map(str::to_string)
        .ok_or_else(|| missing("infobox image link"))?;

    Ok(ParsedPage { shortdesc, symbolism, neighbours, visibility, flavor_text, image_href })
}

/// Lead paragraph after the infobox, concatenated from its child nodes
/// with reference superscripts skipped, then cut to length.
fn flavor_text(doc: &Html) -> Result<String, SkyError> {
    let table = first_element(doc, "table.infobox.plainlist")?;
    let paragraph = table
        .next_sibling()
        .and_then(|node| node.next_sibling())
        .ok_or_else(|| missing("lead paragraph after infobox"))?;

    let mut text = String::new();
    let mut cursor = paragraph.first_child();
    while let Some(node) = cursor {
        // The trailing child is never appended; the walk stops at it
        if node.next_sibling().is_none() {
            break;
        }
        let is_sup = node
            .value()
            .as_element()
            .is_some_and(|el| el.name() == "sup");
        if !is_sup {
            text.push_str(&node_text(&node));
        }
        cursor = node.next_sibling();
    }

    Ok(cut_flavor_text(text))
}

/// Cut at the first space inside the window; with no space there the
/// last character is dropped instead.
fn cut_flavor_text(text: String) -> String {
    let window_end = FLAVOR_CUT_TO.min(text.len());
    let cut = text
        .get(FLAVOR_CUT_FROM..window_end)
        .and_then(|window| window.find(' ').map(|i| FLAVOR_CUT_FROM + i));

    match cut {
        Some(index) => text[..index].to_string(),
        None => {
            let mut text = text;
            text.pop();
            text
        }
    }
}

fn selector(css: &str) -> Result<Selector, SkyError> {
    Selector::parse(css)
        .map_err(|e| SkyError::ScrapeParse(format!("invalid selector '{}': {:?}", css, e)))
}

fn missing(what: &str) -> SkyError {
    SkyError::ScrapeParse(format!("page is missing expected element: {}", what))
}

fn first_element<'a>(doc: &'a Html, css: &str) -> Result<ElementRef<'a>, SkyError> {
    let selector = selector(css)?;
    doc.select(&selector).next().ok_or_else(|| missing(css))
}

/// Infobox data cell next to the label row whose text contains `label`.
fn infobox_value<'a>(doc: &'a Html, label: &str) -> Result<ElementRef<'a>, SkyError> {
    let labels = selector("th.infobox-label")?;
    doc.select(&labels)
        .find(|th| element_text(th).contains(label))
        .and_then(|th| th.next_siblings().find_map(ElementRef::wrap))
        .ok_or_else(|| missing(&format!("infobox row '{}'", label)))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

fn node_text(node: &ego_tree::NodeRef<'_, Node>) -> String {
    if let Some(text) = node.value().as_text() {
        return text.text.to_string();
    }
    if let Some(element) = ElementRef::wrap(*node) {
        return element.text().collect();
    }
    String::new()
}

/// First letter of every alphabetic run uppercased, the rest lowered.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
