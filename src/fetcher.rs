//! Fetch-with-retry for a single item.

use crate::browser::{Browser, Page};
use crate::config::ScrapeConfig;
use crate::error::AttemptError;
use crate::quote::{FetchOutcome, ItemId, PriceQuote};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Parses listing text such as `" 1,250 "` into a price.
///
/// Prices past `u32::MAX` are rejected like any other unreadable text.
pub fn parse_price(text: &str) -> Result<u32, AttemptError> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<u32>().map_err(|_| AttemptError::PriceParse {
        text: text.to_string(),
    })
}

/// Fetches one item's sell and buy prices, retrying on a fresh page.
pub struct ItemFetcher<B> {
    browser: Arc<B>,
    config: Arc<ScrapeConfig>,
}

impl<B> Clone for ItemFetcher<B> {
    fn clone(&self) -> Self {
        Self {
            browser: self.browser.clone(),
            config: self.config.clone(),
        }
    }
}

impl<B: Browser> ItemFetcher<B> {
    pub fn new(browser: Arc<B>, config: Arc<ScrapeConfig>) -> Self {
        Self { browser, config }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Runs up to `retry_budget` attempts and returns the first success.
    ///
    /// Never fails: every attempt error ends up as a retry or, once the
    /// budget is spent, as [`FetchOutcome::Failure`].
    pub async fn fetch(&self, item: &ItemId) -> FetchOutcome {
        let budget = self.config.retry_budget;

        for attempt in 1..=budget {
            info!(item = %item, attempt, "starting fetch");

            match self.attempt(item).await {
                Ok(quote) => {
                    info!(
                        item = %item,
                        attempt,
                        seller = quote.seller_price(),
                        buyer = quote.buyer_price(),
                        profit = quote.profit(),
                        "fetched prices"
                    );
                    return FetchOutcome::Success(quote);
                }
                Err(e) => {
                    warn!(
                        item = %item,
                        attempt,
                        max_attempts = budget,
                        kind = e.kind(),
                        error = %e,
                        "fetch attempt failed"
                    );
                }
            }
        }

        error!(item = %item, attempts = budget, "retry budget exhausted, skipping item");
        FetchOutcome::Failure(item.clone())
    }

    /// One attempt on a fresh page. The page is closed whatever the result.
    async fn attempt(&self, item: &ItemId) -> Result<PriceQuote, AttemptError> {
        let mut page = self.browser.open().await?;
        let read = self.read_quote(&mut page, item).await;

        if let Err(e) = page.close().await {
            warn!(item = %item, kind = e.kind(), error = %e, "failed to close page");
        }
        read
    }

    async fn read_quote(
        &self,
        page: &mut B::Page,
        item: &ItemId,
    ) -> Result<PriceQuote, AttemptError> {
        let config = &*self.config;
        let selectors = &config.selectors;

        page.navigate(&config.item_url(item), config.long_timeout).await?;
        page.await_network_idle(config.long_timeout).await?;

        page.await_selector(&selectors.seller_price, config.short_timeout).await?;
        let seller_price = parse_price(&page.read_text(&selectors.seller_price).await?)?;

        // The toggle may render after the sell list does.
        page.await_selector(&selectors.buy_toggle, config.short_timeout).await?;
        page.click(&selectors.buy_toggle).await?;

        page.await_selector(&selectors.buyer_price, config.short_timeout).await?;
        let buyer_price = parse_price(&page.read_text(&selectors.buyer_price).await?)?;

        Ok(PriceQuote::new(item.clone(), seller_price, buyer_price))
    }
}
