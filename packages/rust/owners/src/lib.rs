//! Owner lookup against county property-record sites.
//!
//! This crate provides:
//! - [`counties`] — per-county lookup strategies ([`FultonLookup`],
//!   [`DekalbLookup`]) behind the [`CountyLookup`] trait
//! - [`CountyRegistry`] — dispatches a county cell value to its strategy
//! - [`ScrapeSession`] — the shared HTTP session, acquired once per run
//! - [`OwnerProvider`] / [`CountyRecordsProvider`] — the seam the pipeline
//!   orchestrator talks to

pub mod counties;
mod provider;
mod session;

pub use counties::{
    CountyLookup, CountyRegistry, DekalbLookup, FultonLookup, normalize_county_key,
};
pub use provider::{CountyRecordsProvider, OwnerProvider};
pub use session::ScrapeSession;
