//! Bounded admission for fetch tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Counting gate that admits at most `capacity` holders at once.
///
/// Clones share the same slots.
#[derive(Debug, Clone)]
pub struct Gate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    holders: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

/// A granted slot. Dropping it releases the slot.
#[derive(Debug)]
pub struct GatePermit {
    holders: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Runs before `_permit` is dropped, so the counter never reads above capacity.
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Gate {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            holders: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits for a free slot.
    ///
    /// Only fails if the gate has been closed.
    pub async fn acquire(&self) -> Result<GatePermit, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        let now = self.holders.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        Ok(GatePermit {
            holders: self.holders.clone(),
            _permit: permit,
        })
    }

    /// Stops admitting holders; pending and future `acquire` calls fail.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.holders.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous holders observed so far.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::time::Duration;

    #[tokio::test]
    async fn permit_releases_on_drop() {
        let gate = Gate::new(2);
        let a = gate.acquire().await.unwrap();
        let b = gate.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 2);

        drop(a);
        assert_eq!(gate.in_flight(), 1);
        drop(b);
        assert_eq!(gate.in_flight(), 0);
        assert_eq!(gate.peak(), 2);
    }

    #[tokio::test]
    async fn third_holder_waits() {
        let gate = Gate::new(2);
        let _a = gate.acquire().await.unwrap();
        let b = gate.acquire().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(50), gate.acquire()).await;
        assert!(waiting.is_err(), "gate admitted a third holder");

        drop(b);
        let c = tokio::time::timeout(Duration::from_millis(500), gate.acquire()).await;
        assert!(c.is_ok());
    }

    #[tokio::test]
    async fn closed_gate_rejects() {
        let gate = Gate::new(1);
        gate.close();
        assert!(gate.acquire().await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_capacity_under_random_load() {
        for round in 0..5 {
            let capacity = rand::thread_rng().gen_range(1..=8);
            let tasks = rand::thread_rng().gen_range(10..=60);
            let gate = Gate::new(capacity);

            let handles: Vec<_> = (0..tasks)
                .map(|_| {
                    let gate = gate.clone();
                    let hold_us = rand::thread_rng().gen_range(0..2_000);
                    tokio::spawn(async move {
                        let _permit = gate.acquire().await.unwrap();
                        assert!(gate.in_flight() <= gate.capacity());
                        tokio::time::sleep(Duration::from_micros(hold_us)).await;
                        tokio::task::yield_now().await;
                        assert!(gate.in_flight() <= gate.capacity());
                    })
                })
                .collect();

            for handle in handles {
                handle.await.unwrap();
            }

            assert!(
                gate.peak() <= capacity,
                "round {round}: peak {} exceeded capacity {capacity}",
                gate.peak()
            );
            assert_eq!(gate.in_flight(), 0);
        }
    }
}
