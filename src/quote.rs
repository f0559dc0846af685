//! Price data produced by a scrape run.

use serde::Serialize;
use std::fmt;

/// Catalog key for one tradeable item, e.g. `primed_flow`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lowest sell order and highest buy order seen for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    item: ItemId,
    seller_price: u32,
    buyer_price: u32,
}

impl PriceQuote {
    pub fn new(item: ItemId, seller_price: u32, buyer_price: u32) -> Self {
        Self {
            item,
            seller_price,
            buyer_price,
        }
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn seller_price(&self) -> u32 {
        self.seller_price
    }

    pub fn buyer_price(&self) -> u32 {
        self.buyer_price
    }

    /// Buyer price minus seller price. Negative when the spread is upside down.
    ///
    /// Exact for every pair of `u32` prices.
    pub fn profit(&self) -> i64 {
        i64::from(self.buyer_price) - i64::from(self.seller_price)
    }
}

/// Result of fetching one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(PriceQuote),
    Failure(ItemId),
}

impl FetchOutcome {
    pub fn item(&self) -> &ItemId {
        match self {
            FetchOutcome::Success(quote) => quote.item(),
            FetchOutcome::Failure(item) => item,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Ranked successes and the items that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    quotes: Vec<PriceQuote>,
    failed: Vec<ItemId>,
}

impl BatchResult {
    /// Partitions outcomes and ranks the successes by profit, highest first.
    ///
    /// `outcomes` must be in catalog order: the sort is stable, so equal
    /// profits keep that order.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = FetchOutcome>) -> Self {
        let mut quotes = Vec::new();
        let mut failed = Vec::new();

        for outcome in outcomes {
            match outcome {
                FetchOutcome::Success(quote) => quotes.push(quote),
                FetchOutcome::Failure(item) => failed.push(item),
            }
        }

        quotes.sort_by(|a, b| b.profit().cmp(&a.profit()));

        Self { quotes, failed }
    }

    pub fn quotes(&self) -> &[PriceQuote] {
        &self.quotes
    }

    /// Failed items, in catalog order.
    pub fn failed(&self) -> &[ItemId] {
        &self.failed
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.quotes.len() + self.failed.len()
    }

    /// True when there was at least one item and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.quotes.is_empty() && !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(id: &str, seller: u32, buyer: u32) -> FetchOutcome {
        FetchOutcome::Success(PriceQuote::new(ItemId::from(id), seller, buyer))
    }

    #[test]
    fn profit_is_buyer_minus_seller() {
        let q = PriceQuote::new("primed_flow".into(), 120, 95);
        assert_eq!(q.profit(), -25);

        let q = PriceQuote::new("blind_rage".into(), 10, 15);
        assert_eq!(q.profit(), 5);
    }

    #[test]
    fn profit_is_exact_at_price_extremes() {
        let q = PriceQuote::new("a".into(), u32::MAX, 0);
        assert_eq!(q.profit(), -4_294_967_295);

        let q = PriceQuote::new("b".into(), 0, u32::MAX);
        assert_eq!(q.profit(), 4_294_967_295);

        let result = BatchResult::from_outcomes(vec![
            quote("low", u32::MAX, 10),
            quote("high", 10, u32::MAX),
        ]);
        assert_eq!(result.quotes()[0].item().as_str(), "high");
    }

    #[test]
    fn successes_sorted_by_profit_descending() {
        let result = BatchResult::from_outcomes(vec![
            quote("a", 10, 12),
            quote("b", 10, 40),
            FetchOutcome::Failure("c".into()),
            quote("d", 50, 20),
        ]);

        let order: Vec<&str> = result.quotes().iter().map(|q| q.item().as_str()).collect();
        assert_eq!(order, vec!["b", "a", "d"]);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failed(), &[ItemId::from("c")]);
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn equal_profits_keep_catalog_order() {
        let result = BatchResult::from_outcomes(vec![
            quote("first", 5, 10),
            quote("second", 100, 105),
            quote("top", 0, 50),
            quote("third", 1, 6),
        ]);

        let order: Vec<&str> = result.quotes().iter().map(|q| q.item().as_str()).collect();
        assert_eq!(order, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn empty_batch() {
        let result = BatchResult::from_outcomes(Vec::new());
        assert!(result.quotes().is_empty());
        assert_eq!(result.failure_count(), 0);
        assert!(!result.all_failed());
    }

    #[test]
    fn all_failed_only_without_successes() {
        let failures = BatchResult::from_outcomes(vec![FetchOutcome::Failure("a".into())]);
        assert!(failures.all_failed());

        let mixed = BatchResult::from_outcomes(vec![
            FetchOutcome::Failure("a".into()),
            quote("b", 1, 1),
        ]);
        assert!(!mixed.all_failed());
    }

    #[test]
    fn outcome_item_accessor() {
        assert_eq!(quote("x", 1, 2).item().as_str(), "x");
        let failure = FetchOutcome::Failure("y".into());
        assert_eq!(failure.item().as_str(), "y");
        assert!(!failure.is_success());
    }
}
