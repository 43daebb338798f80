//! Cadence tracking and playlist-build client for the tempo app.

pub mod cadence;
pub mod config;
pub mod error;
pub mod playlist_client;
pub mod sensor;
pub mod session;
pub mod store;
pub mod tempo;
pub mod tracker;

pub use cadence::CadenceEstimator;
pub use config::{load_settings, Settings};
pub use error::BuildError;
pub use playlist_client::{prepare_request, PlaylistBuildClient};
pub use sensor::{ChannelSensor, StepSensor, StepSubscription};
pub use session::PlaylistSession;
pub use store::PlaylistStore;
pub use tempo::TempoTargetController;
pub use tracker::{CadenceDisplay, CadenceTracker};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
