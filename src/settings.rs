use std::path::PathBuf;
use std::time::Duration;

use config::Config;
use serde::Deserialize;
use tracing::warn;

use crate::report::Location;
use crate::sources::LEPRIXIMMO_URL;

/// Runtime settings, read from `PRICES_*` environment variables.
///
/// Every field has a default so an empty environment targets
/// Rue Brossolette, 92400 Courbevoie and writes `data.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub postal_code: String,
    /// Substring searched (case-insensitively) in the DVF street name and
    /// in the first cell of the lepriximmo table rows.
    pub street_match: String,
    pub street_name: String,
    pub scrape_street_name: String,
    pub city: String,
    pub department: String,
    pub output_path: PathBuf,
    /// Page template for the scrape; `{year}` is substituted.
    pub lepriximmo_url: String,
    pub connect_timeout_secs: u64,
    /// Whole-request deadline, body included. A DVF archive is a few hundred
    /// MB, so this has to cover the slowest expected link.
    pub download_timeout_secs: u64,
    pub scrape_timeout_secs: u64,
    pub scrape_delay_ms: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            postal_code: "92400".to_string(),
            street_match: "BROSSOLETTE".to_string(),
            street_name: "Rue Brossolette".to_string(),
            scrape_street_name: "Rue Pierre Brossolette".to_string(),
            city: "Courbevoie".to_string(),
            department: "Hauts-de-Seine".to_string(),
            output_path: PathBuf::from("data.json"),
            lepriximmo_url: LEPRIXIMMO_URL.to_string(),
            connect_timeout_secs: 30,
            download_timeout_secs: 1800,
            scrape_timeout_secs: 15,
            scrape_delay_ms: 1000,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

impl Settings {
    /// Load from the environment; a broken value falls back to the defaults.
    pub fn load() -> Settings {
        let loaded = Config::builder()
            .add_source(config::Environment::with_prefix("PRICES"))
            .build()
            .and_then(|c| c.try_deserialize::<Settings>());
        match loaded {
            Ok(s) => s,
            Err(e) => {
                warn!("Ignoring PRICES_* settings ({}), using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }

    pub fn scrape_delay(&self) -> Duration {
        Duration::from_millis(self.scrape_delay_ms)
    }

    pub fn dvf_location(&self) -> Location {
        self.location(&self.street_name)
    }

    pub fn scrape_location(&self) -> Location {
        self.location(&self.scrape_street_name)
    }

    fn location(&self, street: &str) -> Location {
        Location {
            street: street.to_string(),
            postal_code: self.postal_code.clone(),
            city: self.city.clone(),
            department: self.department.clone(),
        }
    }
}
