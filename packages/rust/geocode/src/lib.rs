//! U.S. Census geocoder client.
//!
//! Resolves a street address to its administrative county via the Census
//! geocoding API. The [`Geocoder`] trait is the pipeline's collaborator
//! boundary: implementations must not error — every fault (network, timeout,
//! no match, malformed response) maps to `None`, with the reason logged.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use titlescout_shared::{GeocodeConfig, Result, TitleScoutError};
use tracing::{debug, warn};

/// User-Agent string for geocoder requests.
const USER_AGENT: &str = concat!("TitleScout/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// AddressQuery
// ---------------------------------------------------------------------------

/// The address components sent to the geocoder.
///
/// Missing components are tolerated: they are skipped from the normalized
/// string and sent as empty request parameters, never treated as fatal.
#[derive(Debug, Clone, Default)]
pub struct AddressQuery {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressQuery {
    /// Human-readable single-line form, skipping blank components.
    /// Used for logs and progress output.
    pub fn normalized(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for piece in [&self.street, &self.city] {
            let piece = piece.trim();
            if !piece.is_empty() {
                parts.push(piece.to_string());
            }
        }
        let tail = format!("{} {}", self.state.trim(), self.zip.trim())
            .trim()
            .to_string();
        if !tail.is_empty() {
            parts.push(tail);
        }
        parts.join(", ")
    }
}

impl std::fmt::Display for AddressQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized())
    }
}

// ---------------------------------------------------------------------------
// Geocoder trait
// ---------------------------------------------------------------------------

/// Collaborator boundary for county resolution.
///
/// Must not error: any underlying fault is translated into `None` inside the
/// implementation.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve the county name for an address, or `None`.
    async fn county(&self, query: &AddressQuery) -> Option<String>;
}

// ---------------------------------------------------------------------------
// CensusGeocoder
// ---------------------------------------------------------------------------

/// Geocoder backed by the U.S. Census geocoding API.
pub struct CensusGeocoder {
    endpoint: String,
    client: reqwest::Client,
}

impl CensusGeocoder {
    /// Build a geocoder with a bounded per-request timeout.
    pub fn new(config: &GeocodeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TitleScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl Geocoder for CensusGeocoder {
    async fn county(&self, query: &AddressQuery) -> Option<String> {
        let address = query.normalized();
        debug!(%address, "geocoding");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("street", query.street.trim()),
                ("city", query.city.trim()),
                ("state", query.state.trim()),
                ("zip", query.zip.trim()),
                ("benchmark", "Public_AR_Current"),
                ("vintage", "Current_Current"),
                ("format", "json"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(%address, error = %e, "geocoder request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%address, %status, "geocoder returned error status");
            return None;
        }

        let data: Value = match response.json().await {
            Ok(d) => d,
            Err(e) => {
                warn!(%address, error = %e, "geocoder response was not valid JSON");
                return None;
            }
        };

        match county_from_response(&data) {
            Some(county) => {
                debug!(%address, %county, "geocoded");
                Some(county)
            }
            None => {
                warn!(%address, "no county match in geocoder response");
                None
            }
        }
    }
}

/// Walk the Census response shape down to the first match's county name.
///
/// `result.addressMatches[0].geographies.Counties[0].NAME` — anything absent
/// or empty along the way means no match.
fn county_from_response(data: &Value) -> Option<String> {
    let name = data
        .get("result")?
        .get("addressMatches")?
        .as_array()?
        .first()?
        .get("geographies")?
        .get("Counties")?
        .as_array()?
        .first()?
        .get("NAME")?
        .as_str()?
        .trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
