//! The pipeline-facing owner lookup seam.
//!
//! [`OwnerProvider`] is the collaborator boundary the orchestrator talks to:
//! explicit open/close lifecycle around the run, registry dispatch, and a
//! no-raise lookup contract. [`CountyRecordsProvider`] is the shipped
//! implementation backed by the county strategy registry and a shared
//! [`ScrapeSession`].

use async_trait::async_trait;
use titlescout_shared::{OwnerLookupConfig, Result};
use tracing::warn;

use crate::counties::CountyRegistry;
use crate::session::ScrapeSession;

/// Collaborator boundary for owner resolution.
#[async_trait]
pub trait OwnerProvider: Send + Sync {
    /// Whether a lookup strategy exists for this county value.
    ///
    /// The orchestrator checks this before waiting on the rate limiter, so
    /// unregistered counties cost nothing.
    fn is_registered(&self, county: &str) -> bool;

    /// Acquire the shared session. Fatal on failure — the run cannot proceed.
    fn open(&mut self) -> Result<()>;

    /// Look up the recorded title owner, or `None`. Must not error.
    async fn lookup(&self, county: &str, street: &str, city: &str) -> Option<String>;

    /// Release the session. Best-effort; called exactly once per run.
    fn close(&mut self);
}

/// Owner lookups against real county property-record sites.
pub struct CountyRecordsProvider {
    config: OwnerLookupConfig,
    registry: CountyRegistry,
    session: Option<ScrapeSession>,
}

impl CountyRecordsProvider {
    /// Build a provider with the built-in county registry. The session is
    /// not acquired until [`OwnerProvider::open`].
    pub fn new(config: &OwnerLookupConfig) -> Self {
        Self {
            config: config.clone(),
            registry: CountyRegistry::new(config),
            session: None,
        }
    }
}

#[async_trait]
impl OwnerProvider for CountyRecordsProvider {
    fn is_registered(&self, county: &str) -> bool {
        self.registry.get(county).is_some()
    }

    fn open(&mut self) -> Result<()> {
        if self.session.is_none() {
            self.session = Some(ScrapeSession::open(&self.config)?);
        }
        Ok(())
    }

    async fn lookup(&self, county: &str, street: &str, city: &str) -> Option<String> {
        let Some(session) = self.session.as_ref() else {
            warn!(county, street, "owner lookup attempted without an open session");
            return None;
        };

        let Some(strategy) = self.registry.get(county) else {
            warn!(county, street, "no lookup strategy for county");
            return None;
        };

        strategy.lookup_owner(session, street, city).await
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> CountyRecordsProvider {
        let config = OwnerLookupConfig {
            delay_secs: 0.0,
            timeout_secs: 10,
            fulton_search_url: format!("{}/search", server.uri()),
            dekalb_search_url: String::new(),
        };
        CountyRecordsProvider::new(&config)
    }

    #[tokio::test]
    async fn resolves_owner_through_search_and_detail() {
        let server = MockServer::start().await;

        let results = r#"<html><body>
            <table class="search-results">
                <tr><td><a href="/parcel/14-0042">123 MAIN ST</a></td></tr>
            </table>
        </body></html>"#;

        let detail = r#"<html><body>
            <h1>Parcel 14-0042</h1>
            <div id="ownerName">DOE JOHN &amp; JANE</div>
        </body></html>"#;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("address", "123 Main St"))
            .and(query_param("city", "Atlanta"))
            .respond_with(ResponseTemplate::new(200).set_body_string(results))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/parcel/14-0042"))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail))
            .mount(&server)
            .await;

        let mut provider = provider_for(&server);
        provider.open().unwrap();
        let owner = provider
            .lookup("Fulton County", "123 Main St", "Atlanta")
            .await;
        provider.close();

        assert_eq!(owner.as_deref(), Some("DOE JOHN & JANE"));
    }

    #[tokio::test]
    async fn no_search_results_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>No parcels matched.</p></body></html>"),
            )
            .mount(&server)
            .await;

        let mut provider = provider_for(&server);
        provider.open().unwrap();
        let owner = provider
            .lookup("Fulton County", "999 Nowhere Ln", "Atlanta")
            .await;
        provider.close();

        assert_eq!(owner, None);
    }

    #[tokio::test]
    async fn detail_page_without_owner_is_none() {
        let server = MockServer::start().await;

        let results =
            r#"<html><body><a class="parcel-link" href="/parcel/7">7</a></body></html>"#;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(results))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/parcel/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>Parcel data unavailable</p></body></html>"),
            )
            .mount(&server)
            .await;

        let mut provider = provider_for(&server);
        provider.open().unwrap();
        let owner = provider.lookup("Fulton County", "7 Elm St", "Atlanta").await;
        provider.close();

        assert_eq!(owner, None);
    }

    #[tokio::test]
    async fn unregistered_county_makes_no_requests() {
        let server = MockServer::start().await;

        let mut provider = provider_for(&server);
        provider.open().unwrap();
        let owner = provider
            .lookup("Gwinnett County", "1 Oak St", "Lawrenceville")
            .await;
        provider.close();

        assert_eq!(owner, None);
        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn lookup_without_open_session_is_none() {
        let server = MockServer::start().await;

        let provider = provider_for(&server);
        let owner = provider
            .lookup("Fulton County", "123 Main St", "Atlanta")
            .await;
        assert_eq!(owner, None);
    }
}
