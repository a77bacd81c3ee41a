//! Field enrichers.
//!
//! Each enricher resolves one missing field via its external collaborator,
//! paced by its own [`RateLimiter`]. Collaborator faults never escape: every
//! non-success path collapses to [`EnrichmentOutcome::Unresolved`], with the
//! record's address in the log for later manual review.

use titlescout_geocode::{AddressQuery, Geocoder};
use titlescout_owners::OwnerProvider;
use titlescout_shared::EnrichmentOutcome;
use tracing::{debug, warn};

use crate::ratelimit::RateLimiter;

// ---------------------------------------------------------------------------
// GeocodeEnricher
// ---------------------------------------------------------------------------

/// Resolves missing county names through the geocoding collaborator.
pub struct GeocodeEnricher<'a> {
    geocoder: &'a dyn Geocoder,
    limiter: RateLimiter,
}

impl<'a> GeocodeEnricher<'a> {
    /// Create an enricher with its own rate limiter.
    pub fn new(geocoder: &'a dyn Geocoder, delay_secs: f64) -> Self {
        Self {
            geocoder,
            limiter: RateLimiter::from_secs_f64(delay_secs),
        }
    }

    /// Attempt to resolve the county for one record.
    pub async fn enrich(&self, query: &AddressQuery) -> EnrichmentOutcome {
        self.limiter.wait().await;

        match self.geocoder.county(query).await {
            Some(county) if !county.trim().is_empty() => {
                debug!(address = %query, county = %county.trim(), "county resolved");
                EnrichmentOutcome::Resolved(county.trim().to_string())
            }
            _ => {
                warn!(address = %query, "county unresolved");
                EnrichmentOutcome::Unresolved
            }
        }
    }
}

// ---------------------------------------------------------------------------
// OwnerEnricher
// ---------------------------------------------------------------------------

/// Resolves missing title owners through the scraping collaborator,
/// dispatching on the record's county value.
pub struct OwnerEnricher<'a> {
    provider: &'a dyn OwnerProvider,
    limiter: RateLimiter,
}

impl<'a> OwnerEnricher<'a> {
    /// Create an enricher with its own rate limiter.
    pub fn new(provider: &'a dyn OwnerProvider, delay_secs: f64) -> Self {
        Self {
            provider,
            limiter: RateLimiter::from_secs_f64(delay_secs),
        }
    }

    /// Attempt to resolve the owner for one record.
    ///
    /// An unregistered county returns immediately, before the rate limiter —
    /// no collaborator call is spent on a lookup that cannot succeed.
    pub async fn enrich(&self, county: &str, street: &str, city: &str) -> EnrichmentOutcome {
        if !self.provider.is_registered(county) {
            debug!(county, street, "county not registered, skipping lookup");
            return EnrichmentOutcome::Unresolved;
        }

        self.limiter.wait().await;

        match self.provider.lookup(county, street, city).await {
            Some(owner) if !owner.trim().is_empty() => {
                debug!(county, street, owner = %owner.trim(), "owner resolved");
                EnrichmentOutcome::Resolved(owner.trim().to_string())
            }
            _ => {
                warn!(county, street, city, "owner unresolved");
                EnrichmentOutcome::Unresolved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use titlescout_shared::Result;

    struct StubGeocoder {
        county: Option<String>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn county(&self, _query: &AddressQuery) -> Option<String> {
            *self.calls.lock().unwrap() += 1;
            self.county.clone()
        }
    }

    struct StubOwners {
        registered: Vec<String>,
        owner: Option<String>,
        lookups: Mutex<usize>,
    }

    #[async_trait]
    impl OwnerProvider for StubOwners {
        fn is_registered(&self, county: &str) -> bool {
            self.registered
                .iter()
                .any(|c| c.eq_ignore_ascii_case(county))
        }

        fn open(&mut self) -> Result<()> {
            Ok(())
        }

        async fn lookup(&self, _county: &str, _street: &str, _city: &str) -> Option<String> {
            *self.lookups.lock().unwrap() += 1;
            self.owner.clone()
        }

        fn close(&mut self) {}
    }

    fn query() -> AddressQuery {
        AddressQuery {
            street: "123 Main St".into(),
            city: "Atlanta".into(),
            state: "GA".into(),
            zip: "30309".into(),
        }
    }

    #[tokio::test]
    async fn geocode_success_resolves_trimmed_value() {
        let stub = StubGeocoder {
            county: Some("  Fulton County  ".into()),
            calls: Mutex::new(0),
        };
        let enricher = GeocodeEnricher::new(&stub, 0.0);
        let outcome = enricher.enrich(&query()).await;
        assert_eq!(
            outcome,
            EnrichmentOutcome::Resolved("Fulton County".into())
        );
    }

    #[tokio::test]
    async fn geocode_none_and_blank_are_unresolved() {
        let none = StubGeocoder {
            county: None,
            calls: Mutex::new(0),
        };
        let enricher = GeocodeEnricher::new(&none, 0.0);
        assert_eq!(enricher.enrich(&query()).await, EnrichmentOutcome::Unresolved);

        let blank = StubGeocoder {
            county: Some("   ".into()),
            calls: Mutex::new(0),
        };
        let enricher = GeocodeEnricher::new(&blank, 0.0);
        assert_eq!(enricher.enrich(&query()).await, EnrichmentOutcome::Unresolved);
    }

    #[tokio::test]
    async fn owner_resolves_for_registered_county() {
        let stub = StubOwners {
            registered: vec!["Fulton County".into()],
            owner: Some("JOHN DOE".into()),
            lookups: Mutex::new(0),
        };
        let enricher = OwnerEnricher::new(&stub, 0.0);
        let outcome = enricher.enrich("Fulton County", "123 Main St", "Atlanta").await;
        assert_eq!(outcome, EnrichmentOutcome::Resolved("JOHN DOE".into()));
        assert_eq!(*stub.lookups.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn unregistered_county_makes_zero_collaborator_calls() {
        let stub = StubOwners {
            registered: vec!["Fulton County".into()],
            owner: Some("JOHN DOE".into()),
            lookups: Mutex::new(0),
        };
        let enricher = OwnerEnricher::new(&stub, 0.0);
        let outcome = enricher.enrich("Gwinnett County", "1 Oak St", "Duluth").await;
        assert_eq!(outcome, EnrichmentOutcome::Unresolved);
        assert_eq!(*stub.lookups.lock().unwrap(), 0);
    }
}
