//! Concurrent marketplace price scraper.
//!
//! Every item in the [`catalog`] gets one fetch task. Tasks pass through a
//! bounded [`gate::Gate`], retry page loads through [`fetcher::ItemFetcher`],
//! and are ranked by profit into a [`quote::BatchResult`] that the
//! [`report`] module renders.

pub mod browser;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod gate;
pub mod logging;
pub mod orchestrator;
pub mod quote;
pub mod report;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use error::{AttemptError, Error, Result};
pub use quote::{BatchResult, FetchOutcome, ItemId, PriceQuote};
