///! Error taxonomy for the backend operations
///!
///! Input and parse failures propagate to the caller as explicit kinds;
///! fast-tier unavailability never appears here - the cache layers
///! degrade locally instead of surfacing it.

use stargaze_common::ConstellId;
use thiserror::Error;

use crate::module::catalog::StoreError;

#[derive(Debug, Error)]
pub enum SkyError {
    /// Longitude/latitude string that is not a decimal number
    #[error("invalid coordinate value '{0}'")]
    InvalidCoordinate(String),

    /// Clock string that does not split into hour/minute/second
    #[error("invalid time value '{0}', expected HH:MM:SS")]
    InvalidTime(String),

    /// Date string that does not split into year-month-day
    #[error("invalid date value '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Non-numeric constellation id in a request
    #[error("invalid constellation id '{0}'")]
    InvalidId(String),

    /// No record for the id in any tier
    #[error("constellation {0} not found")]
    NotFound(ConstellId),

    /// Scraped page structure did not match the expected markup;
    /// partial records are never produced
    #[error("scrape failed: {0}")]
    ScrapeParse(String),

    /// Transport failure talking to the external content API
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Durable catalog store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SkyError {
    /// True for the malformed-input family, which maps to client errors
    /// at the HTTP boundary.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SkyError::InvalidCoordinate(_)
                | SkyError::InvalidTime(_)
                | SkyError::InvalidDate(_)
                | SkyError::InvalidId(_)
        )
    }
}
