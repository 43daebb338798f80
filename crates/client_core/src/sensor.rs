//! Step-counter sensor boundary.

use std::{
    collections::HashMap,
    fmt,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    task::{Context, Poll},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use futures::Stream;
use shared::domain::StepSample;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

const SAMPLE_BUFFER: usize = 64;

#[async_trait]
pub trait StepSensor: Send + Sync {
    /// Whether the device has a step counter at all.
    async fn is_available(&self) -> Result<bool>;
    /// Starts delivering samples. The registration lives exactly as long as
    /// the returned subscription.
    fn watch_step_count(&self) -> Result<StepSubscription>;
}

/// Live sensor registration. Yields samples in delivery order and runs its
/// release hook once, when dropped.
pub struct StepSubscription {
    samples: ReceiverStream<StepSample>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl StepSubscription {
    pub fn new(
        samples: mpsc::Receiver<StepSample>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            samples: ReceiverStream::new(samples),
            release: Some(Box::new(release)),
        }
    }
}

impl fmt::Debug for StepSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSubscription")
            .field("released", &self.release.is_none())
            .finish()
    }
}

impl Stream for StepSubscription {
    type Item = StepSample;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.samples).poll_next(cx)
    }
}

impl Drop for StepSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// In-process sensor fed through [`ChannelSensor::publish`]. Backs the CLI
/// replay and tests.
#[derive(Clone)]
pub struct ChannelSensor {
    inner: Arc<ChannelSensorInner>,
}

struct ChannelSensorInner {
    available: bool,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, mpsc::Sender<StepSample>>>,
}

impl ChannelSensorInner {
    fn subscribers(&self) -> MutexGuard<'_, HashMap<u64, mpsc::Sender<StepSample>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChannelSensor {
    pub fn new(available: bool) -> Self {
        Self {
            inner: Arc::new(ChannelSensorInner {
                available,
                next_id: AtomicU64::new(0),
                subscribers: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn available() -> Self {
        Self::new(true)
    }

    pub fn unavailable() -> Self {
        Self::new(false)
    }

    /// Delivers `sample` to every live subscription; returns how many got it.
    pub async fn publish(&self, sample: StepSample) -> usize {
        let targets: Vec<(u64, mpsc::Sender<StepSample>)> = self
            .inner
            .subscribers()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        for (id, tx) in targets {
            if tx.send(sample).await.is_ok() {
                delivered += 1;
            } else {
                self.inner.subscribers().remove(&id);
            }
        }
        delivered
    }

    pub fn active_subscriptions(&self) -> usize {
        self.inner.subscribers().len()
    }
}

#[async_trait]
impl StepSensor for ChannelSensor {
    async fn is_available(&self) -> Result<bool> {
        Ok(self.inner.available)
    }

    fn watch_step_count(&self) -> Result<StepSubscription> {
        if !self.inner.available {
            bail!("step counter is not available on this device");
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SAMPLE_BUFFER);
        self.inner.subscribers().insert(id, tx);
        debug!(subscription = id, "sensor: subscribed");

        let inner = Arc::clone(&self.inner);
        Ok(StepSubscription::new(rx, move || {
            inner.subscribers().remove(&id);
            debug!(subscription = id, "sensor: released");
        }))
    }
}

#[cfg(test)]
#[path = "tests/sensor_tests.rs"]
mod tests;
