//! Fulton County, GA property-record lookup.

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::{CountyLookup, extract_owner, first_result_href};
use crate::session::ScrapeSession;

/// Result-link selectors for the Fulton search results page, tried in order.
const RESULT_SELECTORS: &[&str] = &[
    "table.search-results a",
    "#parcel-results a",
    "a.parcel-link",
];

/// Owner-name selectors for the Fulton parcel detail page, tried in order.
/// The generic label-row scan in [`extract_owner`] runs after these.
const OWNER_SELECTORS: &[&str] = &["#ownerName", ".owner-name", "td.owner"];

/// Looks up recorded owners on the Fulton County assessor site.
pub struct FultonLookup {
    search_url: String,
}

impl FultonLookup {
    pub fn new(search_url: &str) -> Self {
        Self {
            search_url: search_url.to_string(),
        }
    }
}

#[async_trait]
impl CountyLookup for FultonLookup {
    fn key(&self) -> &str {
        "fulton"
    }

    fn name(&self) -> &str {
        "Fulton County"
    }

    async fn lookup_owner(
        &self,
        session: &ScrapeSession,
        street: &str,
        city: &str,
    ) -> Option<String> {
        let mut search = match Url::parse(&self.search_url) {
            Ok(u) => u,
            Err(e) => {
                warn!(url = %self.search_url, error = %e, "invalid Fulton search URL");
                return None;
            }
        };
        search
            .query_pairs_mut()
            .append_pair("address", street.trim())
            .append_pair("city", city.trim());

        debug!(street, city, "searching Fulton County records");
        let results_page = session.get_html(search.clone()).await?;

        let detail_url = {
            let doc = Html::parse_document(&results_page);
            match first_result_href(&doc, RESULT_SELECTORS, &search) {
                Some(url) => url,
                None => {
                    warn!(street, city, "no Fulton search results");
                    return None;
                }
            }
        };

        let detail_page = session.get_html(detail_url).await?;
        let doc = Html::parse_document(&detail_page);
        match extract_owner(&doc, OWNER_SELECTORS) {
            Some(owner) => {
                debug!(street, city, %owner, "Fulton owner found");
                Some(owner)
            }
            None => {
                warn!(street, city, "no owner name on Fulton detail page");
                None
            }
        }
    }
}
