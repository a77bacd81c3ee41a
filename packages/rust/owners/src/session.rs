//! Shared HTTP session for county property-record sites.
//!
//! One session is acquired per run, before the first owner lookup, and
//! released exactly once at run end regardless of how many lookups succeeded
//! or failed. Acquisition failure is fatal; release is best-effort.

use std::time::Duration;

use titlescout_shared::{OwnerLookupConfig, Result, TitleScoutError};
use tracing::{info, warn};
use url::Url;

/// User-Agent string for scrape requests.
const USER_AGENT: &str = concat!("TitleScout/", env!("CARGO_PKG_VERSION"));

/// The shared collaborator handle for owner lookups.
pub struct ScrapeSession {
    client: reqwest::Client,
}

impl ScrapeSession {
    /// Acquire the session: build the HTTP client with a bounded timeout.
    pub fn open(config: &OwnerLookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TitleScoutError::Session(format!("failed to open scrape session: {e}")))?;

        info!(timeout_secs = config.timeout_secs, "scrape session opened");
        Ok(Self { client })
    }

    /// Release the session.
    pub fn close(self) {
        info!("scrape session closed");
    }

    /// Fetch a page and return its body, or `None` on any fault.
    ///
    /// Lookup strategies never see transport errors; failures are logged
    /// here with the URL for later diagnosis.
    pub(crate) async fn get_html(&self, url: Url) -> Option<String> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%url, error = %e, "page fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "page fetch returned error status");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(%url, error = %e, "page body read failed");
                None
            }
        }
    }
}
