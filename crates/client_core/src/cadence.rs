//! Steps-per-minute estimation from cumulative step counter samples.

use shared::domain::{CadenceReading, StepSample};
use tracing::debug;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Instantaneous cadence from the two most recent samples.
///
/// A reading only changes on a forward step delta over a forward time delta.
/// Anything else (counter reset, duplicate timestamp, stalled counter) keeps
/// the previous reading but still moves the baseline to the new sample.
#[derive(Debug, Clone)]
pub struct CadenceEstimator {
    baseline: Option<StepSample>,
    enabled: bool,
    reading: Option<CadenceReading>,
}

impl Default for CadenceEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CadenceEstimator {
    pub fn new() -> Self {
        Self {
            baseline: None,
            enabled: true,
            reading: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latest reading, `None` until the first forward delta.
    pub fn reading(&self) -> Option<CadenceReading> {
        self.reading
    }

    pub fn baseline(&self) -> Option<StepSample> {
        self.baseline
    }

    /// Feeds one sensor sample and returns the reading after it.
    pub fn on_sample(&mut self, sample: StepSample) -> Option<CadenceReading> {
        if !self.enabled {
            return self.reading;
        }

        if let Some(previous) = self.baseline {
            if let Some(reading) = rate_between(previous, sample) {
                self.reading = Some(reading);
            } else {
                debug!(
                    previous_steps = previous.cumulative_steps,
                    steps = sample.cumulative_steps,
                    previous_at = previous.observed_at_millis,
                    at = sample.observed_at_millis,
                    "cadence: non-forward sample, keeping previous reading"
                );
            }
        }

        self.baseline = Some(sample);
        self.reading
    }

    /// Re-enabling drops the baseline so the next sample starts a fresh delta.
    /// Disabling freezes the current reading.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.baseline = None;
        }
        self.enabled = enabled;
    }
}

fn rate_between(previous: StepSample, current: StepSample) -> Option<CadenceReading> {
    if current.cumulative_steps <= previous.cumulative_steps {
        return None;
    }
    if current.observed_at_millis <= previous.observed_at_millis {
        return None;
    }

    let delta_steps = (current.cumulative_steps - previous.cumulative_steps) as f64;
    let delta_minutes =
        (current.observed_at_millis - previous.observed_at_millis) as f64 / MILLIS_PER_MINUTE;
    let rate = (delta_steps / delta_minutes).round();
    if !rate.is_finite() {
        return None;
    }

    Some(CadenceReading {
        steps_per_minute: rate.min(f64::from(u32::MAX)) as u32,
    })
}

#[cfg(test)]
#[path = "tests/cadence_tests.rs"]
mod tests;
