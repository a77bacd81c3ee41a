//! County lookup strategy trait and built-in county strategies.
//!
//! Each county property-record site has its own search entry point and
//! markup, so lookup logic is per-county. Strategies live behind the
//! [`CountyLookup`] trait in a keyed registry; a county with no registered
//! strategy fails fast at dispatch, before any rate-limited call is made.

mod dekalb;
mod fulton;

use async_trait::async_trait;
use scraper::{Html, Selector};
use titlescout_shared::OwnerLookupConfig;
use tracing::{debug, warn};
use url::Url;

use crate::session::ScrapeSession;

pub use dekalb::DekalbLookup;
pub use fulton::FultonLookup;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One county's owner-lookup strategy.
///
/// A strategy submits street+city to its county's search entry point,
/// follows the first matching result to the parcel detail page, and parses
/// an owner name out of it. Every failure at any step yields `None`; only a
/// fully extracted, non-empty owner name is accepted.
#[async_trait]
pub trait CountyLookup: Send + Sync {
    /// Normalized registry key (e.g. `fulton`).
    fn key(&self) -> &str;

    /// Display name for logs (e.g. `Fulton County`).
    fn name(&self) -> &str;

    /// Look up the recorded title owner for an address.
    async fn lookup_owner(
        &self,
        session: &ScrapeSession,
        street: &str,
        city: &str,
    ) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Normalize a county cell value into a registry key.
///
/// Trims, lowercases, and drops a trailing "county" word, so
/// `"Fulton County"`, `" FULTON "`, and `"fulton"` all dispatch alike.
pub fn normalize_county_key(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    lowered
        .strip_suffix("county")
        .unwrap_or(&lowered)
        .trim()
        .to_string()
}

/// Holds the registered county strategies, keyed by normalized county name.
pub struct CountyRegistry {
    strategies: Vec<Box<dyn CountyLookup>>,
}

impl CountyRegistry {
    /// Register the built-in strategies for every county whose search URL
    /// is configured. An empty URL leaves the county unregistered.
    pub fn new(config: &OwnerLookupConfig) -> Self {
        let mut strategies: Vec<Box<dyn CountyLookup>> = Vec::new();

        if !config.fulton_search_url.trim().is_empty() {
            strategies.push(Box::new(FultonLookup::new(&config.fulton_search_url)));
        }
        if !config.dekalb_search_url.trim().is_empty() {
            strategies.push(Box::new(DekalbLookup::new(&config.dekalb_search_url)));
        }

        debug!(count = strategies.len(), "county strategies registered");
        Self { strategies }
    }

    /// Find the strategy for a county cell value, or `None` if unregistered.
    pub fn get(&self, county_value: &str) -> Option<&dyn CountyLookup> {
        let key = normalize_county_key(county_value);
        self.strategies
            .iter()
            .find(|s| s.key() == key)
            .map(|s| s.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Shared extraction helpers
// ---------------------------------------------------------------------------

/// Find the first result link on a search results page.
///
/// Selectors are tried in order; the first matching element with an `href`
/// wins. The href is resolved against the page URL.
pub(crate) fn first_result_href(doc: &Html, selectors: &[&str], base: &Url) -> Option<Url> {
    for sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            if let Some(href) = el.value().attr("href") {
                match base.join(href) {
                    Ok(resolved) => return Some(resolved),
                    Err(e) => {
                        warn!(href, error = %e, "result link did not resolve");
                    }
                }
            }
        }
    }
    None
}

/// Extract an owner name from a parcel detail page.
///
/// Site markup is not uniform, so several structural patterns are tried in
/// order: the county's own selectors first, then a generic label scan over
/// table rows whose header cell mentions "owner". First non-empty match wins.
pub(crate) fn extract_owner(doc: &Html, selectors: &[&str]) -> Option<String> {
    for sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            if let Some(owner) = clean_owner_text(&el.text().collect::<String>()) {
                return Some(owner);
            }
        }
    }

    // Generic fallback: a two-cell table row whose first cell labels the owner.
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("th, td").unwrap();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|c| c.text().collect::<String>())
            .collect();
        if cells.len() >= 2 && cells[0].to_lowercase().contains("owner") {
            if let Some(owner) = clean_owner_text(&cells[1]) {
                return Some(owner);
            }
        }
    }

    None
}

/// Collapse internal whitespace and trim; empty results are rejected.
pub(crate) fn clean_owner_text(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use titlescout_shared::AppConfig;

    fn test_config() -> OwnerLookupConfig {
        OwnerLookupConfig::from(&AppConfig::default())
    }

    #[test]
    fn county_key_normalization() {
        assert_eq!(normalize_county_key("Fulton County"), "fulton");
        assert_eq!(normalize_county_key("  FULTON  "), "fulton");
        assert_eq!(normalize_county_key("fulton"), "fulton");
        assert_eq!(normalize_county_key("DeKalb County"), "dekalb");
        assert_eq!(normalize_county_key("Gwinnett County"), "gwinnett");
    }

    #[test]
    fn registry_dispatches_known_counties() {
        let registry = CountyRegistry::new(&test_config());
        assert_eq!(registry.get("Fulton County").unwrap().key(), "fulton");
        assert_eq!(registry.get("dekalb county").unwrap().key(), "dekalb");
        assert_eq!(registry.get("DeKalb").unwrap().name(), "DeKalb County");
    }

    #[test]
    fn registry_rejects_unknown_counties() {
        let registry = CountyRegistry::new(&test_config());
        assert!(registry.get("Gwinnett County").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn empty_url_leaves_county_unregistered() {
        let mut config = test_config();
        config.fulton_search_url = "".into();
        let registry = CountyRegistry::new(&config);
        assert!(registry.get("Fulton County").is_none());
        assert!(registry.get("DeKalb County").is_some());
    }

    #[test]
    fn first_result_href_tries_selectors_in_order() {
        let html = r##"<html><body>
            <table id="results">
                <tr><td><a href="/parcel/42">42 Detail</a></td></tr>
            </table>
        </body></html>"##;
        let doc = Html::parse_document(html);
        let base = Url::parse("https://records.example.com/search").unwrap();

        let href = first_result_href(&doc, &["a.result-link", "table#results a"], &base);
        assert_eq!(
            href.unwrap().as_str(),
            "https://records.example.com/parcel/42"
        );
    }

    #[test]
    fn extract_owner_prefers_county_selectors() {
        let html = r#"<html><body>
            <span class="owner-name">  SMITH   JOHN &amp; JANE </span>
            <table><tr><th>Owner</th><td>WRONG FALLBACK</td></tr></table>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let owner = extract_owner(&doc, &[".owner-name"]);
        assert_eq!(owner.as_deref(), Some("SMITH JOHN & JANE"));
    }

    #[test]
    fn extract_owner_falls_back_to_label_scan() {
        let html = r#"<html><body>
            <table class="parcel-summary">
                <tr><th>Parcel ID</th><td>14-0042-0001</td></tr>
                <tr><th>Owner Name</th><td>DOE JOHN</td></tr>
            </table>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let owner = extract_owner(&doc, &[".owner-name", "#ownerName"]);
        assert_eq!(owner.as_deref(), Some("DOE JOHN"));
    }

    #[test]
    fn extract_owner_rejects_empty_markup() {
        let html = r#"<html><body><span class="owner-name">   </span></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_owner(&doc, &[".owner-name"]), None);
    }
}
