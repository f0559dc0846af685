//! Text and JSON renderings of a finished batch.

use crate::quote::BatchResult;
use serde_json::{Value, json};
use std::time::Duration;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct QuoteRow<'a> {
    #[tabled(rename = "Item")]
    item: &'a str,
    #[tabled(rename = "Seller")]
    seller: String,
    #[tabled(rename = "Buyer")]
    buyer: String,
    #[tabled(rename = "Profit")]
    profit: String,
}

pub struct Report<'a> {
    result: &'a BatchResult,
    elapsed: Duration,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a BatchResult, elapsed: Duration) -> Self {
        Self { result, elapsed }
    }

    /// Ranked table followed by the run summary.
    pub fn render_table(&self) -> String {
        let mut out = String::new();

        if self.result.quotes().is_empty() {
            out.push_str("No prices retrieved.\n");
        } else {
            let rows = self.result.quotes().iter().map(|q| QuoteRow {
                item: q.item().as_str(),
                seller: format!("{}p", q.seller_price()),
                buyer: format!("{}p", q.buyer_price()),
                profit: format!("{}p", q.profit()),
            });
            out.push_str(&Table::new(rows).to_string());
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&format!(
            "Program completed in {:.2} seconds\n",
            self.elapsed.as_secs_f64()
        ));
        out.push_str(&format!(
            "Number of failed items: {}\n",
            self.result.failure_count()
        ));
        if !self.result.failed().is_empty() {
            let names: Vec<&str> = self.result.failed().iter().map(|i| i.as_str()).collect();
            out.push_str(&format!("Failed: {}\n", names.join(", ")));
        }
        out
    }

    pub fn to_json(&self) -> Value {
        let quotes: Vec<Value> = self
            .result
            .quotes()
            .iter()
            .map(|q| {
                json!({
                    "item": q.item(),
                    "seller_price": q.seller_price(),
                    "buyer_price": q.buyer_price(),
                    "profit": q.profit(),
                })
            })
            .collect();

        json!({
            "generated_at": chrono::Local::now().to_rfc3339(),
            "elapsed_secs": self.elapsed.as_secs_f64(),
            "quotes": quotes,
            "failed": self.result.failed(),
            "failure_count": self.result.failure_count(),
        })
    }

    pub fn render_json(&self) -> String {
        format!("{:#}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{FetchOutcome, PriceQuote};

    fn mixed() -> BatchResult {
        BatchResult::from_outcomes(vec![
            FetchOutcome::Success(PriceQuote::new("primed_flow".into(), 10, 15)),
            FetchOutcome::Failure("blind_rage".into()),
            FetchOutcome::Success(PriceQuote::new("primed_reach".into(), 1_200, 1_000)),
        ])
    }

    #[test]
    fn table_lists_ranked_quotes_and_summary() {
        let result = mixed();
        let text = Report::new(&result, Duration::from_millis(12_345)).render_table();

        let flow = text.find("primed_flow").unwrap();
        let reach = text.find("primed_reach").unwrap();
        assert!(flow < reach, "higher profit must come first:\n{text}");
        assert!(text.contains("-200p"));
        assert!(text.contains("Program completed in 12.35 seconds"));
        assert!(text.contains("Number of failed items: 1"));
        assert!(text.contains("Failed: blind_rage"));
    }

    #[test]
    fn empty_batch_renders_summary_only() {
        let result = BatchResult::default();
        let text = Report::new(&result, Duration::ZERO).render_table();
        assert!(text.starts_with("No prices retrieved."));
        assert!(text.contains("Number of failed items: 0"));
        assert!(!text.contains("Failed:"));
    }

    #[test]
    fn json_carries_computed_profit() {
        let result = mixed();
        let value = Report::new(&result, Duration::from_secs(2)).to_json();

        assert_eq!(value["failure_count"], 1);
        assert_eq!(value["failed"][0], "blind_rage");
        assert_eq!(value["quotes"][0]["item"], "primed_flow");
        assert_eq!(value["quotes"][0]["profit"], 5);
        assert_eq!(value["quotes"][1]["profit"], -200);
        assert_eq!(value["elapsed_secs"], 2.0);
    }
}
