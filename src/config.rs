//! Run settings.

use crate::error::{Error, Result};
use crate::quote::ItemId;
use scraper::Selector;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_RETRY_BUDGET: u32 = 3;
pub const DEFAULT_SHORT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_LONG_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MARKET_URL: &str = "https://warframe.market";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// CSS selectors for the item page. These track the marketplace's current
/// markup and break whenever it is restyled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    /// Price of the first sell order.
    pub seller_price: String,
    /// Radio button that switches the listing to buy orders.
    pub buy_toggle: String,
    /// Price of the first buy order.
    pub buyer_price: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            seller_price: r#"[data-index="0"] .price--LQgqJ.sell--UxmH0 b"#.into(),
            buy_toggle: "label.btn.btn__primary--L8HyD.btn__radio--tcfEf.activeWtb--SEkhf.wtb"
                .into(),
            buyer_price: r#"[data-index="0"] .price--LQgqJ.buy--lHHVs b"#.into(),
        }
    }
}

impl Selectors {
    fn all(&self) -> [&str; 3] {
        [
            self.seller_price.as_str(),
            self.buy_toggle.as_str(),
            self.buyer_price.as_str(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Maximum number of items fetched at the same time.
    pub concurrency: usize,
    /// Attempts per item before it is counted as failed.
    pub retry_budget: u32,
    /// Bound on element waits.
    pub short_timeout: Duration,
    /// Bound on navigation and network-idle waits.
    pub long_timeout: Duration,
    pub market_url: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub selectors: Selectors,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry_budget: DEFAULT_RETRY_BUDGET,
            short_timeout: DEFAULT_SHORT_TIMEOUT,
            long_timeout: DEFAULT_LONG_TIMEOUT,
            market_url: DEFAULT_MARKET_URL.into(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.into(),
            headless: true,
            selectors: Selectors::default(),
        }
    }
}

impl ScrapeConfig {
    /// Canonical listing page for an item.
    pub fn item_url(&self, item: &ItemId) -> String {
        format!("{}/items/{}", self.market_url.trim_end_matches('/'), item)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        if self.retry_budget == 0 {
            return Err(Error::Config("retry budget must be at least 1".into()));
        }
        if self.short_timeout.is_zero() || self.long_timeout.is_zero() {
            return Err(Error::Config("timeouts must be non-zero".into()));
        }
        if self.market_url.trim().is_empty() {
            return Err(Error::Config("market url is empty".into()));
        }
        if self.webdriver_url.trim().is_empty() {
            return Err(Error::Config("webdriver url is empty".into()));
        }

        for selector in self.selectors.all() {
            Selector::parse(selector).map_err(|e| Error::InvalidSelector {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ScrapeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.retry_budget, 3);
        assert_eq!(config.short_timeout, Duration::from_secs(15));
        assert_eq!(config.long_timeout, Duration::from_secs(30));
    }

    #[test]
    fn item_url_joins_base() {
        let mut config = ScrapeConfig::default();
        assert_eq!(
            config.item_url(&"primed_flow".into()),
            "https://warframe.market/items/primed_flow"
        );

        config.market_url = "http://127.0.0.1:8080/".into();
        assert_eq!(
            config.item_url(&"blind_rage".into()),
            "http://127.0.0.1:8080/items/blind_rage"
        );
    }

    #[test]
    fn rejects_zero_limits() {
        let config = ScrapeConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ScrapeConfig {
            retry_budget: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ScrapeConfig {
            short_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_selector() {
        let mut config = ScrapeConfig::default();
        config.selectors.buyer_price = "[data-index=".into();

        match config.validate() {
            Err(Error::InvalidSelector { selector, .. }) => assert_eq!(selector, "[data-index="),
            other => panic!("expected invalid selector, got {other:?}"),
        }
    }
}
