//! DeKalb County, GA property-record lookup.

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::{CountyLookup, extract_owner, first_result_href};
use crate::session::ScrapeSession;

/// Result-link selectors for the DeKalb search results page, tried in order.
/// DeKalb renders results as a list rather than a table.
const RESULT_SELECTORS: &[&str] = &[
    "ul.results a",
    ".result-row a",
    "table#search-results a",
];

/// Owner-name selectors for the DeKalb parcel detail page, tried in order.
const OWNER_SELECTORS: &[&str] = &[".property-owner", "#owner", "span.owner-name"];

/// Looks up recorded owners on the DeKalb County property appraisal site.
pub struct DekalbLookup {
    search_url: String,
}

impl DekalbLookup {
    pub fn new(search_url: &str) -> Self {
        Self {
            search_url: search_url.to_string(),
        }
    }
}

#[async_trait]
impl CountyLookup for DekalbLookup {
    fn key(&self) -> &str {
        "dekalb"
    }

    fn name(&self) -> &str {
        "DeKalb County"
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
                warn!(url = %self.search_url, error = %e, "invalid DeKalb search URL");
                return None;
            }
        };
        // DeKalb takes a single free-text query parameter.
        let query = format!("{} {}", street.trim(), city.trim());
        search.query_pairs_mut().append_pair("q", query.trim());

        debug!(street, city, "searching DeKalb County records");
        let results_page = session.get_html(search.clone()).await?;

        let detail_url = {
            let doc = Html::parse_document(&results_page);
            match first_result_href(&doc, RESULT_SELECTORS, &search) {
                Some(url) => url,
                None => {
                    warn!(street, city, "no DeKalb search results");
                    return None;
                }
            }
        };

        let detail_page = session.get_html(detail_url).await?;
        let doc = Html::parse_document(&detail_page);
        match extract_owner(&doc, OWNER_SELECTORS) {
            Some(owner) => {
                debug!(street, city, %owner, "DeKalb owner found");
                Some(owner)
            }
            None => {
                warn!(street, city, "no owner name on DeKalb detail page");
                None
            }
        }
    }
}
