//! Error types.
//!
//! [`AttemptError`] covers anything that can go wrong inside a single fetch
//! attempt; the fetcher retries all of its variants the same way. [`Error`]
//! covers the fatal path: bad configuration or a browser backend that cannot
//! be reached before the batch starts.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for fatal operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort the run before any item is fetched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("webdriver at {url} is unreachable: {source}")]
    DriverUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("webdriver at {url} is not ready: {message}")]
    DriverNotReady { url: String, message: String },

    #[error("webdriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
}

/// Failure of one navigate-and-read cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("navigation to {url} did not settle within {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("selector `{selector}` did not appear within {timeout:?}")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("could not parse a price from {text:?}")]
    PriceParse { text: String },

    #[error("automation error: {0}")]
    Automation(String),
}

impl AttemptError {
    /// Stable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::NavigationTimeout { .. } => "navigation_timeout",
            AttemptError::SelectorTimeout { .. } => "selector_timeout",
            AttemptError::PriceParse { .. } => "price_parse",
            AttemptError::Automation(_) => "automation",
        }
    }

    pub fn automation(err: impl std::fmt::Display) -> Self {
        AttemptError::Automation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            AttemptError::NavigationTimeout {
                url: "u".into(),
                timeout: Duration::from_secs(1),
            },
            AttemptError::SelectorTimeout {
                selector: "s".into(),
                timeout: Duration::from_secs(1),
            },
            AttemptError::PriceParse { text: "x".into() },
            AttemptError::automation("boom"),
        ];
        let mut kinds: Vec<_> = errors.iter().map(AttemptError::kind).collect();
        kinds.dedup();
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn messages_carry_context() {
        let err = AttemptError::PriceParse { text: "n/a".into() };
        assert_eq!(err.to_string(), "could not parse a price from \"n/a\"");

        let err = Error::Config("concurrency must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "configuration error: concurrency must be at least 1"
        );
    }
}
