//! Application configuration for TitleScout.
//!
//! User config lives at `~/.titlescout/titlescout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TitleScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "titlescout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".titlescout";

// ---------------------------------------------------------------------------
// Config structs (matching titlescout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tabular file settings (column names, sentinel).
    #[serde(default)]
    pub table: TableSection,

    /// Census geocoder settings.
    #[serde(default)]
    pub geocoder: GeocoderSection,

    /// County property-record site settings.
    #[serde(default)]
    pub owner_lookup: OwnerLookupSection,
}

/// `[table]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSection {
    /// Placeholder string treated as a missing value.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    /// Street address column header.
    #[serde(default = "default_street_column")]
    pub street_column: String,

    /// City column header.
    #[serde(default = "default_city_column")]
    pub city_column: String,

    /// State column header.
    #[serde(default = "default_state_column")]
    pub state_column: String,

    /// ZIP code column header.
    #[serde(default = "default_zip_column")]
    pub zip_column: String,

    /// County name column header (created on load if absent).
    #[serde(default = "default_county_column")]
    pub county_column: String,

    /// Title owner column header (created on load if absent).
    #[serde(default = "default_owner_column")]
    pub owner_column: String,
}

impl Default for TableSection {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            street_column: default_street_column(),
            city_column: default_city_column(),
            state_column: default_state_column(),
            zip_column: default_zip_column(),
            county_column: default_county_column(),
            owner_column: default_owner_column(),
        }
    }
}

fn default_sentinel() -> String {
    "UNKNOWN".into()
}
fn default_street_column() -> String {
    "StreetAddress".into()
}
fn default_city_column() -> String {
    "City".into()
}
fn default_state_column() -> String {
    "State".into()
}
fn default_zip_column() -> String {
    "Zipcode".into()
}
fn default_county_column() -> String {
    "CountyName".into()
}
fn default_owner_column() -> String {
    "TitleOwner".into()
}

/// `[geocoder]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderSection {
    /// Census geocoder endpoint URL.
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,

    /// Minimum seconds between geocoder requests.
    #[serde(default = "default_geocoder_delay")]
    pub delay_secs: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocoderSection {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
            delay_secs: default_geocoder_delay(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_geocoder_endpoint() -> String {
    "https://geocoding.geo.census.gov/geocoder/geographies/address".into()
}
fn default_geocoder_delay() -> f64 {
    0.5
}
fn default_timeout() -> u64 {
    10
}

/// `[owner_lookup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerLookupSection {
    /// Minimum seconds between requests to any county site.
    #[serde(default = "default_owner_delay")]
    pub delay_secs: f64,

    /// Per-request timeout in seconds (search and detail pages).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Fulton County property search URL. Empty disables the county.
    #[serde(default = "default_fulton_url")]
    pub fulton_search_url: String,

    /// DeKalb County property search URL. Empty disables the county.
    #[serde(default = "default_dekalb_url")]
    pub dekalb_search_url: String,
}

impl Default for OwnerLookupSection {
    fn default() -> Self {
        Self {
            delay_secs: default_owner_delay(),
            timeout_secs: default_timeout(),
            fulton_search_url: default_fulton_url(),
            dekalb_search_url: default_dekalb_url(),
        }
    }
}

fn default_owner_delay() -> f64 {
    1.5
}
fn default_fulton_url() -> String {
    "https://fultonassessor.org/property-search".into()
}
fn default_dekalb_url() -> String {
    "https://propertyappraisal.dekalbcountyga.gov/search".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime table configuration passed into the store.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Placeholder string treated as a missing value.
    pub sentinel: String,
    /// Required address column headers.
    pub street_column: String,
    pub city_column: String,
    pub state_column: String,
    pub zip_column: String,
    /// Target column headers (created on load if absent).
    pub county_column: String,
    pub owner_column: String,
}

impl From<&AppConfig> for TableConfig {
    fn from(config: &AppConfig) -> Self {
        let t = &config.table;
        Self {
            sentinel: t.sentinel.clone(),
            street_column: t.street_column.clone(),
            city_column: t.city_column.clone(),
            state_column: t.state_column.clone(),
            zip_column: t.zip_column.clone(),
            county_column: t.county_column.clone(),
            owner_column: t.owner_column.clone(),
        }
    }
}

/// Runtime geocoder configuration.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Census geocoder endpoint URL.
    pub endpoint: String,
    /// Minimum seconds between requests.
    pub delay_secs: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for GeocodeConfig {
    fn from(config: &AppConfig) -> Self {
        let g = &config.geocoder;
        Self {
            endpoint: g.endpoint.clone(),
            delay_secs: g.delay_secs,
            timeout_secs: g.timeout_secs,
        }
    }
}

/// Runtime owner-lookup configuration.
#[derive(Debug, Clone)]
pub struct OwnerLookupConfig {
    /// Minimum seconds between requests to any county site.
    pub delay_secs: f64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Fulton County property search URL. Empty disables the county.
    pub fulton_search_url: String,
    /// DeKalb County property search URL. Empty disables the county.
    pub dekalb_search_url: String,
}

impl From<&AppConfig> for OwnerLookupConfig {
    fn from(config: &AppConfig) -> Self {
        let o = &config.owner_lookup;
        Self {
            delay_secs: o.delay_secs,
            timeout_secs: o.timeout_secs,
            fulton_search_url: o.fulton_search_url.clone(),
            dekalb_search_url: o.dekalb_search_url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.titlescout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TitleScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.titlescout/titlescout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TitleScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TitleScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TitleScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TitleScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TitleScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the geocoder endpoint is set and is a valid URL.
///
/// The endpoint is required configuration: the pipeline aborts before any
/// enrichment if it is absent or malformed.
pub fn validate_geocoder(config: &AppConfig) -> Result<()> {
    let endpoint = config.geocoder.endpoint.trim();
    if endpoint.is_empty() {
        return Err(TitleScoutError::config(
            "geocoder endpoint not set. Add [geocoder] endpoint to titlescout.toml.",
        ));
    }
    Url::parse(endpoint)
        .map_err(|e| TitleScoutError::config(format!("invalid geocoder endpoint '{endpoint}': {e}")))?;
    Ok(())
}

/// Check that any configured county search URLs parse. Empty values are
/// allowed (they disable the county); malformed values are a config error.
pub fn validate_owner_lookup(config: &AppConfig) -> Result<()> {
    for (name, value) in [
        ("fulton_search_url", &config.owner_lookup.fulton_search_url),
        ("dekalb_search_url", &config.owner_lookup.dekalb_search_url),
    ] {
        let value = value.trim();
        if !value.is_empty() {
            Url::parse(value).map_err(|e| {
                TitleScoutError::config(format!("invalid {name} '{value}': {e}"))
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("sentinel"));
        assert!(toml_str.contains("geocoding.geo.census.gov"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.table.sentinel, "UNKNOWN");
        assert_eq!(parsed.geocoder.delay_secs, 0.5);
        assert_eq!(parsed.geocoder.timeout_secs, 10);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[geocoder]
delay_secs = 2.0

[owner_lookup]
fulton_search_url = "https://example.com/fulton"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.geocoder.delay_secs, 2.0);
        assert!(config.geocoder.endpoint.contains("census.gov"));
        assert_eq!(
            config.owner_lookup.fulton_search_url,
            "https://example.com/fulton"
        );
        assert_eq!(config.table.county_column, "CountyName");
    }

    #[test]
    fn runtime_configs_from_app_config() {
        let app = AppConfig::default();
        let table = TableConfig::from(&app);
        assert_eq!(table.street_column, "StreetAddress");
        assert_eq!(table.owner_column, "TitleOwner");

        let geocode = GeocodeConfig::from(&app);
        assert_eq!(geocode.delay_secs, 0.5);

        let owners = OwnerLookupConfig::from(&app);
        assert_eq!(owners.timeout_secs, 10);
    }

    #[test]
    fn geocoder_validation_rejects_empty_endpoint() {
        let mut config = AppConfig::default();
        config.geocoder.endpoint = "".into();
        let result = validate_geocoder(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("endpoint not set"));
    }

    #[test]
    fn geocoder_validation_rejects_malformed_endpoint() {
        let mut config = AppConfig::default();
        config.geocoder.endpoint = "not a url".into();
        assert!(validate_geocoder(&config).is_err());
    }

    #[test]
    fn owner_lookup_validation_allows_empty_urls() {
        let mut config = AppConfig::default();
        config.owner_lookup.fulton_search_url = "".into();
        config.owner_lookup.dekalb_search_url = "".into();
        assert!(validate_owner_lookup(&config).is_ok());
    }
}
