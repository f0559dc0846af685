//! Fans the catalog out over the fetcher and aggregates the outcomes.

use crate::browser::Browser;
use crate::catalog::Catalog;
use crate::fetcher::ItemFetcher;
use crate::gate::Gate;
use crate::quote::{BatchResult, FetchOutcome};
use futures::future::join_all;
use tracing::{error, info};

/// Runs the fetcher over a whole catalog behind a concurrency gate.
pub struct Orchestrator<B> {
    catalog: Catalog,
    fetcher: ItemFetcher<B>,
    gate: Gate,
}

impl<B: Browser> Orchestrator<B> {
    pub fn new(catalog: Catalog, fetcher: ItemFetcher<B>, gate: Gate) -> Self {
        Self {
            catalog,
            fetcher,
            gate,
        }
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Fetches every catalog entry and returns one outcome per entry, in
    /// catalog order.
    ///
    /// One task is spawned per item; each holds a gate slot for all of its
    /// attempts. A task that panics or cannot enter the gate is reported as
    /// a failure for its item.
    pub async fn collect_outcomes(&self) -> Vec<FetchOutcome> {
        info!(
            items = self.catalog.len(),
            concurrency = self.gate.capacity(),
            retry_budget = self.fetcher.config().retry_budget,
            "starting batch"
        );

        let handles: Vec<_> = self
            .catalog
            .iter()
            .cloned()
            .map(|item| {
                let gate = self.gate.clone();
                let fetcher = self.fetcher.clone();
                tokio::spawn(async move {
                    let _permit = match gate.acquire().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            error!(item = %item, error = %e, "could not enter concurrency gate");
                            return FetchOutcome::Failure(item);
                        }
                    };
                    fetcher.fetch(&item).await
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(self.catalog.iter())
            .map(|(joined, item)| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(item = %item, error = %e, "fetch task aborted");
                    FetchOutcome::Failure(item.clone())
                }
            })
            .collect()
    }

    /// Fetches the whole catalog and ranks the results.
    pub async fn run(&self) -> BatchResult {
        let outcomes = self.collect_outcomes().await;
        let result = BatchResult::from_outcomes(outcomes);

        info!(
            succeeded = result.quotes().len(),
            failed = result.failure_count(),
            "batch finished"
        );
        result
    }
}
