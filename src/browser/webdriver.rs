//! W3C WebDriver backend built on thirtyfour.
//!
//! Every page is its own WebDriver session against the shared driver
//! server, which keeps concurrent attempts from fighting over window focus.

use super::{Browser, Page};
use crate::config::ScrapeConfig;
use crate::error::{AttemptError, Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thirtyfour::prelude::*;
use thirtyfour::{ChromeCapabilities, ChromiumLikeCapabilities};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info};

const STATUS_TIMEOUT: Duration = Duration::from_secs(10);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long the resource count must stay flat before the network counts as idle.
const IDLE_QUIET_PERIOD: Duration = Duration::from_millis(500);

const LOAD_PROBE: &str =
    "return { state: document.readyState, resources: performance.getEntriesByType('resource').length };";

#[derive(Debug, Deserialize)]
struct StatusResponse {
    value: StatusValue,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    ready: bool,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoadSnapshot {
    state: String,
    resources: u64,
}

pub struct WebDriverBrowser {
    server_url: String,
    capabilities: ChromeCapabilities,
}

impl WebDriverBrowser {
    /// Checks that the driver server is up and ready for sessions.
    ///
    /// Nothing is fetched if this fails.
    pub async fn connect(config: &ScrapeConfig) -> Result<Self> {
        let server_url = config.webdriver_url.trim_end_matches('/').to_string();
        probe_status(&server_url).await?;

        let mut capabilities = DesiredCapabilities::chrome();
        if config.headless {
            capabilities.set_headless()?;
        }
        capabilities.add_arg("--disable-gpu")?;
        capabilities.add_arg("--window-size=1920,1080")?;

        info!(url = %server_url, headless = config.headless, "webdriver ready");
        Ok(Self {
            server_url,
            capabilities,
        })
    }
}

async fn probe_status(server_url: &str) -> Result<()> {
    let unreachable = |source| Error::DriverUnreachable {
        url: server_url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(STATUS_TIMEOUT)
        .build()
        .map_err(unreachable)?;

    let status: StatusResponse = client
        .get(format!("{server_url}/status"))
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(unreachable)?
        .json()
        .await
        .map_err(unreachable)?;

    if !status.value.ready {
        return Err(Error::DriverNotReady {
            url: server_url.to_string(),
            message: status.value.message,
        });
    }
    Ok(())
}

#[async_trait]
impl Browser for WebDriverBrowser {
    type Page = WebDriverPage;

    async fn open(&self) -> std::result::Result<WebDriverPage, AttemptError> {
        let driver = WebDriver::new(self.server_url.as_str(), self.capabilities.clone())
            .await
            .map_err(AttemptError::automation)?;
        Ok(WebDriverPage {
            driver,
            url: String::new(),
        })
    }
}

pub struct WebDriverPage {
    driver: WebDriver,
    /// Last URL passed to `navigate`.
    url: String,
}

type AttemptResult<T> = std::result::Result<T, AttemptError>;

#[async_trait]
impl Page for WebDriverPage {
    async fn navigate(&mut self, url: &str, limit: Duration) -> AttemptResult<()> {
        self.url = url.to_string();
        within(limit, self.driver.goto(url), || AttemptError::NavigationTimeout {
            url: url.to_string(),
            timeout: limit,
        })
        .await?
        .map_err(AttemptError::automation)
    }

    async fn await_network_idle(&mut self, limit: Duration) -> AttemptResult<()> {
        let url = &self.url;
        within(limit, settle(&self.driver), || AttemptError::NavigationTimeout {
            url: url.clone(),
            timeout: limit,
        })
        .await?
    }

    async fn await_selector(&mut self, selector: &str, limit: Duration) -> AttemptResult<()> {
        within(limit, present(&self.driver, selector), || {
            AttemptError::SelectorTimeout {
                selector: selector.to_string(),
                timeout: limit,
            }
        })
        .await?
    }

    async fn read_text(&mut self, selector: &str) -> AttemptResult<String> {
        let element = self
            .driver
            .find(By::Css(selector))
            .await
            .map_err(AttemptError::automation)?;
        element.text().await.map_err(AttemptError::automation)
    }

    async fn click(&mut self, selector: &str) -> AttemptResult<()> {
        let element = self
            .driver
            .find(By::Css(selector))
            .await
            .map_err(AttemptError::automation)?;
        element.click().await.map_err(AttemptError::automation)
    }

    async fn close(self) -> AttemptResult<()> {
        match timeout(CLOSE_TIMEOUT, self.driver.quit()).await {
            Ok(result) => result.map_err(AttemptError::automation),
            Err(_) => Err(AttemptError::automation(format!(
                "session did not quit within {CLOSE_TIMEOUT:?}"
            ))),
        }
    }
}

/// Runs `fut` under `limit`. The elapsed error is built without touching the
/// session, which may be the thing that hung.
async fn within<F, T>(
    limit: Duration,
    fut: F,
    elapsed: impl FnOnce() -> AttemptError,
) -> AttemptResult<T>
where
    F: Future<Output = T>,
{
    timeout(limit, fut).await.map_err(|_| elapsed())
}

/// Polls until the document is complete and no new resources have started
/// loading for [`IDLE_QUIET_PERIOD`].
async fn settle(driver: &WebDriver) -> AttemptResult<()> {
    let mut last_count = None;
    let mut quiet_since = Instant::now();
    loop {
        let ret = driver
            .execute(LOAD_PROBE, Vec::new())
            .await
            .map_err(AttemptError::automation)?;
        let snapshot: LoadSnapshot =
            serde_json::from_value(ret.json().clone()).map_err(AttemptError::automation)?;

        if last_count != Some(snapshot.resources) {
            last_count = Some(snapshot.resources);
            quiet_since = Instant::now();
        } else if snapshot.state == "complete" && quiet_since.elapsed() >= IDLE_QUIET_PERIOD {
            debug!(resources = snapshot.resources, "network idle");
            return Ok(());
        }
        sleep(POLL_INTERVAL).await;
    }
}

async fn present(driver: &WebDriver, selector: &str) -> AttemptResult<()> {
    loop {
        let found = driver
            .find_all(By::Css(selector))
            .await
            .map_err(AttemptError::automation)?;
        if !found.is_empty() {
            return Ok(());
        }
        sleep(POLL_INTERVAL).await;
    }
}
