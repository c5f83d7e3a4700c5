//! Street-level real-estate prices for a single French street.
//!
//! Two pipelines share this library:
//!   - `dvf`: download the DVF bulk archives, filter rows for the target street,
//!     aggregate €/m² per year.
//!   - `scrape`: read the per-year street table from lepriximmo.fr, falling back
//!     to a static price table when the site has nothing.
//!
//! Both end in a `report::Report` written to a single JSON file.

pub mod dvf;
pub mod error;
pub mod http;
pub mod report;
pub mod scrape;
pub mod settings;
pub mod sources;
pub mod stats;
pub mod utils;

/// Install the fmt subscriber, `RUST_LOG` overriding the default `info` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}
