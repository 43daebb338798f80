use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(LocalPlaylistId);
id_newtype!(RemotePlaylistId);

pub const MIN_TARGET_BPM: u32 = 60;
pub const MAX_TARGET_BPM: u32 = 200;
pub const DEFAULT_TARGET_BPM: u32 = 120;

/// One step-counter callback: the running step total for the current sensing
/// session and the sensor's timestamp for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSample {
    pub cumulative_steps: u64,
    pub observed_at_millis: i64,
}

impl StepSample {
    pub fn new(cumulative_steps: u64, observed_at_millis: i64) -> Self {
        Self {
            cumulative_steps,
            observed_at_millis,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceReading {
    pub steps_per_minute: u32,
}

/// Target tempo picked on the slider. Always inside
/// `[MIN_TARGET_BPM, MAX_TARGET_BPM]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoTarget {
    bpm: u32,
}

impl TempoTarget {
    pub fn clamped(bpm: i64) -> Self {
        let bpm = bpm.clamp(i64::from(MIN_TARGET_BPM), i64::from(MAX_TARGET_BPM));
        Self { bpm: bpm as u32 }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }
}

impl Default for TempoTarget {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_TARGET_BPM,
        }
    }
}

/// A tempo bound as the user supplied it: picker text in the quick-add flow,
/// a number once a build response has confirmed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BpmBound {
    Number(f64),
    Text(String),
}

impl fmt::Display for BpmBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_bpm(*value)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for BpmBound {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for BpmBound {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for BpmBound {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BpmBound {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Renders whole tempos without a trailing `.0`.
pub fn format_bpm(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePlaylistSummary {
    pub playlist_id: RemotePlaylistId,
    pub added_count: u32,
    pub fell_back: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalPlaylist {
    pub id: LocalPlaylistId,
    pub name: String,
    pub min_bpm: BpmBound,
    pub max_bpm: BpmBound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemotePlaylistSummary>,
    pub created_at: DateTime<Utc>,
}

impl LocalPlaylist {
    pub fn bpm_range_label(&self) -> String {
        format!("BPM Range: {} - {}", self.min_bpm, self.max_bpm)
    }
}
