//! Wires a [`StepSensor`] subscription to a [`CadenceEstimator`] and publishes
//! what the cadence widget should show.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use shared::domain::CadenceReading;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    cadence::CadenceEstimator,
    sensor::{StepSensor, StepSubscription},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceDisplay {
    /// No step counter on this device. Never rendered as a number.
    Unsupported,
    /// Tracking, but no forward delta seen yet.
    Waiting,
    Tracking(CadenceReading),
    /// Tracking switched off; holds the reading at the moment it stopped.
    Paused(Option<CadenceReading>),
}

impl CadenceDisplay {
    pub fn label(&self) -> String {
        match self {
            Self::Unsupported => "unsupported".to_string(),
            Self::Waiting | Self::Paused(None) => "--".to_string(),
            Self::Tracking(reading) | Self::Paused(Some(reading)) => {
                reading.steps_per_minute.to_string()
            }
        }
    }
}

pub struct CadenceTracker {
    sensor: Arc<dyn StepSensor>,
    supported: bool,
    estimator: Arc<Mutex<CadenceEstimator>>,
    display: Arc<watch::Sender<CadenceDisplay>>,
    task: Option<JoinHandle<()>>,
}

impl CadenceTracker {
    /// Checks sensor availability once and, if present, starts tracking.
    pub async fn start(sensor: Arc<dyn StepSensor>) -> Result<Self> {
        let supported = match sensor.is_available().await {
            Ok(available) => available,
            Err(err) => {
                warn!(error = %err, "cadence: availability check failed, treating as unsupported");
                false
            }
        };

        let initial = if supported {
            CadenceDisplay::Waiting
        } else {
            CadenceDisplay::Unsupported
        };
        let (display, _) = watch::channel(initial);

        let mut tracker = Self {
            sensor,
            supported,
            estimator: Arc::new(Mutex::new(CadenceEstimator::new())),
            display: Arc::new(display),
            task: None,
        };

        if supported {
            tracker.spawn_consumer()?;
            info!("cadence: tracking started");
        } else {
            info!("cadence: step counter unsupported on this device");
        }
        Ok(tracker)
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// False once the sensor stream has ended on its own, even before
    /// anyone calls [`CadenceTracker::set_enabled`].
    pub fn is_tracking(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn display(&self) -> CadenceDisplay {
        *self.display.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<CadenceDisplay> {
        self.display.subscribe()
    }

    /// Turning tracking off releases the sensor subscription before
    /// returning. Turning it on again subscribes afresh with a new baseline.
    pub async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if !self.supported {
            return Ok(());
        }

        if enabled {
            if self.is_tracking() {
                return Ok(());
            }
            if let Some(ended) = self.task.take() {
                let _ = ended.await;
                debug!("cadence: resubscribing after sample stream ended");
            }
            let reading = {
                let mut estimator = self.estimator.lock().await;
                estimator.set_enabled(true);
                estimator.reading()
            };
            self.display.send_replace(match reading {
                Some(reading) => CadenceDisplay::Tracking(reading),
                None => CadenceDisplay::Waiting,
            });
            if let Err(err) = self.spawn_consumer() {
                self.estimator.lock().await.set_enabled(false);
                self.display.send_replace(CadenceDisplay::Paused(reading));
                return Err(err);
            }
            info!("cadence: tracking resumed");
        } else {
            let Some(task) = self.task.take() else {
                return Ok(());
            };
            {
                // Holding the lock while publishing keeps a late sample from
                // overwriting the paused state.
                let mut estimator = self.estimator.lock().await;
                estimator.set_enabled(false);
                self.display
                    .send_replace(CadenceDisplay::Paused(estimator.reading()));
            }
            task.abort();
            let _ = task.await;
            info!("cadence: tracking paused");
        }
        Ok(())
    }

    fn spawn_consumer(&mut self) -> Result<()> {
        let subscription = self
            .sensor
            .watch_step_count()
            .context("failed to subscribe to step counter")?;
        let estimator = Arc::clone(&self.estimator);
        let display = Arc::clone(&self.display);
        self.task = Some(tokio::spawn(consume_samples(
            subscription,
            estimator,
            display,
        )));
        Ok(())
    }
}

impl Drop for CadenceTracker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn consume_samples(
    mut subscription: StepSubscription,
    estimator: Arc<Mutex<CadenceEstimator>>,
    display: Arc<watch::Sender<CadenceDisplay>>,
) {
    while let Some(sample) = subscription.next().await {
        let mut estimator = estimator.lock().await;
        if !estimator.is_enabled() {
            break;
        }
        if let Some(reading) = estimator.on_sample(sample) {
            display.send_replace(CadenceDisplay::Tracking(reading));
        }
    }
    drop(subscription);

    // Ended without a disable: the sensor closed the stream itself.
    let mut estimator = estimator.lock().await;
    if estimator.is_enabled() {
        estimator.set_enabled(false);
        display.send_replace(CadenceDisplay::Paused(estimator.reading()));
        warn!("cadence: sample stream ended unexpectedly");
    } else {
        debug!("cadence: sample stream ended");
    }
}

#[cfg(test)]
#[path = "tests/tracker_tests.rs"]
mod tests;
