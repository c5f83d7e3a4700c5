use thiserror::Error;

/// Failure of a whole bulk source. Never fatal: the source is skipped.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unreadable archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("no .txt member in archive ({members} entries)")]
    MissingMember { members: usize },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed rows: {0}")]
    Csv(#[from] csv::Error),
}

/// Why a single row did not become a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    NotTarget,
    MissingValue,
    MissingSurface,
    InvalidNumber,
    NonPositiveSurface,
}

impl Rejection {
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::NotTarget => "not_target",
            Rejection::MissingValue => "missing_value",
            Rejection::MissingSurface => "missing_surface",
            Rejection::InvalidNumber => "invalid_number",
            Rejection::NonPositiveSurface => "non_positive_surface",
        }
    }
}

/// Per-year scrape failure; always replaced by a fallback price.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("no price for the street on this page")]
    NotFound,
}
