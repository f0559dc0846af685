//! Scripted browser backend.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{Browser, Page};
use crate::error::AttemptError;

/// What one attempt on a stub page does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Both lookups succeed and return these texts verbatim.
    Prices { seller: String, buyer: String },
    NavigationTimeout,
    SelectorTimeout,
    Automation,
    /// Panics during navigation.
    Panic,
}

impl Step {
    pub fn prices(seller: &str, buyer: &str) -> Self {
        Step::Prices {
            seller: seller.to_string(),
            buyer: buyer.to_string(),
        }
    }
}

#[derive(Default)]
struct Scripts {
    queued: HashMap<String, VecDeque<Step>>,
    fixed: HashMap<String, Step>,
}

impl Scripts {
    /// Next queued step, then the item's fixed step, then a selector timeout.
    fn next(&mut self, item: &str) -> Step {
        if let Some(step) = self.queued.get_mut(item).and_then(VecDeque::pop_front) {
            return step;
        }
        self.fixed
            .get(item)
            .cloned()
            .unwrap_or(Step::SelectorTimeout)
    }
}

#[derive(Default)]
struct StubState {
    scripts: Mutex<Scripts>,
    fail_opens: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    clicks: AtomicUsize,
    open_now: AtomicUsize,
    peak_open: AtomicUsize,
}

impl StubState {
    fn scripts(&self) -> MutexGuard<'_, Scripts> {
        self.scripts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A [`Browser`] whose pages follow per-item scripts.
///
/// The item is taken from the last path segment of the navigated URL.
#[derive(Clone, Default)]
pub struct StubBrowser {
    state: Arc<StubState>,
    latency: Duration,
}

impl StubBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one step per attempt for `item`.
    pub fn script(self, item: &str, steps: Vec<Step>) -> Self {
        self.state
            .scripts()
            .queued
            .entry(item.to_string())
            .or_default()
            .extend(steps);
        self
    }

    /// Step replayed for `item` once its queue is empty.
    pub fn fixed(self, item: &str, step: Step) -> Self {
        self.state.scripts().fixed.insert(item.to_string(), step);
        self
    }

    /// Delay applied to every navigation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes the next `count` calls to `open` fail.
    pub fn fail_opens(self, count: usize) -> Self {
        self.state.fail_opens.store(count, Ordering::SeqCst);
        self
    }

    /// Pages successfully opened.
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Pages currently open.
    pub fn open_pages(&self) -> usize {
        self.state.open_now.load(Ordering::SeqCst)
    }

    /// Highest number of pages open at the same time.
    pub fn peak_open_pages(&self) -> usize {
        self.state.peak_open.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.state.clicks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for StubBrowser {
    type Page = StubPage;

    async fn open(&self) -> Result<StubPage, AttemptError> {
        let refused = self
            .state
            .fail_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(AttemptError::automation("stub refused to open a page"));
        }

        self.state.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.state.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_open.fetch_max(now, Ordering::SeqCst);

        Ok(StubPage {
            state: self.state.clone(),
            latency: self.latency,
            step: None,
            buy_view: false,
        })
    }
}

pub struct StubPage {
    state: Arc<StubState>,
    latency: Duration,
    step: Option<Step>,
    buy_view: bool,
}

#[async_trait]
impl Page for StubPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), AttemptError> {
        let item = url.rsplit('/').next().unwrap_or_default();
        let step = self.state.scripts().next(item);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match &step {
            Step::NavigationTimeout => {
                return Err(AttemptError::NavigationTimeout {
                    url: url.to_string(),
                    timeout,
                });
            }
            Step::Automation => return Err(AttemptError::automation("stub session crashed")),
            Step::Panic => panic!("stub page panicked on {url}"),
            _ => {}
        }
        self.step = Some(step);
        Ok(())
    }

    async fn await_network_idle(&mut self, _timeout: Duration) -> Result<(), AttemptError> {
        Ok(())
    }

    async fn await_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), AttemptError> {
        match self.step {
            Some(Step::Prices { .. }) => Ok(()),
            _ => Err(AttemptError::SelectorTimeout {
                selector: selector.to_string(),
                timeout,
            }),
        }
    }

    async fn read_text(&mut self, selector: &str) -> Result<String, AttemptError> {
        match &self.step {
            Some(Step::Prices { buyer, .. }) if self.buy_view => Ok(buyer.clone()),
            Some(Step::Prices { seller, .. }) => Ok(seller.clone()),
            _ => Err(AttemptError::automation(format!("no element matches {selector}"))),
        }
    }

    async fn click(&mut self, _selector: &str) -> Result<(), AttemptError> {
        self.state.clicks.fetch_add(1, Ordering::SeqCst);
        self.buy_view = true;
        Ok(())
    }

    async fn close(self) -> Result<(), AttemptError> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        self.state.open_now.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
