//! Scripted [`OrderSource`] for pipeline tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Credential, Order};
use crate::error::FetchError;
use crate::port::OrderSource;

/// Returns queued results first, then the standing order list forever.
#[derive(Default)]
pub struct ScriptedOrderSource {
    queued: Mutex<VecDeque<Result<Vec<Order>, FetchError>>>,
    standing: Mutex<Vec<Order>>,
    fetch_count: AtomicU32,
}

impl ScriptedOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders returned by every fetch once the queue is drained.
    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        *self.standing.lock() = orders;
        self
    }

    /// Queue a one-shot result.
    pub fn then(self, result: Result<Vec<Order>, FetchError>) -> Self {
        self.queued.lock().push_back(result);
        self
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        *self.standing.lock() = orders;
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderSource for ScriptedOrderSource {
    async fn fetch(&self, _credential: &Credential) -> Result<Vec<Order>, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.queued.lock().pop_front() {
            return result;
        }
        Ok(self.standing.lock().clone())
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
