use anyhow::Context;
use clap::Parser;
use spread_scout::browser::WebDriverBrowser;
use spread_scout::catalog::Catalog;
use spread_scout::config::{
    DEFAULT_CONCURRENCY, DEFAULT_LONG_TIMEOUT, DEFAULT_MARKET_URL, DEFAULT_RETRY_BUDGET,
    DEFAULT_SHORT_TIMEOUT, DEFAULT_WEBDRIVER_URL, ScrapeConfig, Selectors,
};
use spread_scout::fetcher::ItemFetcher;
use spread_scout::gate::Gate;
use spread_scout::logging::LoggingConfig;
use spread_scout::orchestrator::Orchestrator;
use spread_scout::report::Report;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

const EXIT_FATAL: u8 = 1;
const EXIT_ALL_FAILED: u8 = 2;

/// Scrapes sell and buy prices for the item catalog and ranks them by spread
#[derive(Parser, Debug)]
#[command(name = "spread-scout", version)]
struct Cli {
    /// Maximum number of items fetched at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Attempts per item before giving up on it
    #[arg(long, default_value_t = DEFAULT_RETRY_BUDGET)]
    retries: u32,

    /// Seconds to wait for a price element
    #[arg(long, default_value_t = DEFAULT_SHORT_TIMEOUT.as_secs())]
    short_timeout: u64,

    /// Seconds to wait for navigation and network idle
    #[arg(long, default_value_t = DEFAULT_LONG_TIMEOUT.as_secs())]
    long_timeout: u64,

    /// Marketplace base URL; items live under <url>/items/<id>
    #[arg(long, default_value = DEFAULT_MARKET_URL)]
    market_url: String,

    /// WebDriver server (e.g. a running chromedriver)
    #[arg(long, default_value = DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, default_value = "pretty", value_parser = ["pretty", "json"])]
    log_format: String,
}

impl Cli {
    fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            concurrency: self.concurrency,
            retry_budget: self.retries,
            short_timeout: Duration::from_secs(self.short_timeout),
            long_timeout: Duration::from_secs(self.long_timeout),
            market_url: self.market_url.clone(),
            webdriver_url: self.webdriver_url.clone(),
            headless: !self.headed,
            selectors: Selectors::default(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.clone(),
    }
    .init();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = format!("{e:#}"), "fatal error");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let started = Instant::now();

    let config = cli.scrape_config();
    config.validate().context("invalid configuration")?;
    let catalog = Catalog::builtin().context("invalid catalog")?;

    let browser = WebDriverBrowser::connect(&config)
        .await
        .context("failed to start the browser backend")?;

    let config = Arc::new(config);
    let gate = Gate::new(config.concurrency);
    let fetcher = ItemFetcher::new(Arc::new(browser), config);
    let orchestrator = Orchestrator::new(catalog, fetcher, gate);

    let result = orchestrator.run().await;
    let report = Report::new(&result, started.elapsed());

    if cli.json {
        println!("{}", report.render_json());
    } else {
        println!("\nFinal Results:");
        print!("{}", report.render_table());
    }

    if result.all_failed() {
        info!(failed = result.failure_count(), "no item could be fetched");
        return Ok(ExitCode::from(EXIT_ALL_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}
