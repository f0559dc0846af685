//! Seam between the fetcher and whatever drives the browser.
//!
//! The fetcher only ever talks to [`Browser`] and [`Page`]; the production
//! backend lives in [`webdriver`], tests use `testkit::StubBrowser`.

pub mod webdriver;

pub use webdriver::WebDriverBrowser;

use crate::error::AttemptError;
use async_trait::async_trait;
use std::time::Duration;

/// Shared browsing context. Every call to [`Browser::open`] yields a page
/// that is independent of all other open pages.
#[async_trait]
pub trait Browser: Send + Sync + 'static {
    type Page: Page + 'static;

    async fn open(&self) -> Result<Self::Page, AttemptError>;
}

/// One page, owned by a single fetch attempt.
#[async_trait]
pub trait Page: Send {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), AttemptError>;

    /// Waits until the page has stopped loading resources.
    async fn await_network_idle(&mut self, timeout: Duration) -> Result<(), AttemptError>;

    async fn await_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), AttemptError>;

    /// Visible text of the first element matching `selector`.
    async fn read_text(&mut self, selector: &str) -> Result<String, AttemptError>;

    async fn click(&mut self, selector: &str) -> Result<(), AttemptError>;

    /// Releases the page.
    async fn close(self) -> Result<(), AttemptError>;
}
