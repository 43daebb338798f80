use serde::{Deserialize, Serialize};

use crate::domain::{RemotePlaylistId, UserId};

pub const BUILD_PLAYLIST_PATH: &str = "build_playlist";
pub const PING_PATH: &str = "ping";

/// Body of `POST /build_playlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlaylistRequest {
    pub user_id: UserId,
    pub name: String,
    pub queries: Vec<String>,
    pub min_bpm: f64,
    pub max_bpm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "public",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_public: Option<bool>,
}

/// Per-build counters reported by the service's tempo filter.
///
/// The service has shipped two spellings for two of the counters; both are
/// accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpmStats {
    pub total_input: u32,
    pub missing_isrc: u32,
    #[serde(rename = "bp_lookup_failed", alias = "bpm_lookup_failed")]
    pub bpm_lookup_failed: u32,
    #[serde(
        rename = "bpm_out_of_range_before_nprm",
        alias = "bpm_out_of_range_before_norm"
    )]
    pub bpm_out_of_range_before_normalization: u32,
    pub kept: u32,
}

/// Body of a 2xx reply to `POST /build_playlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlaylistResponse {
    pub playlist_id: RemotePlaylistId,
    pub added_count: u32,
    pub min_bpm: f64,
    pub max_bpm: f64,
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub fell_back: bool,
    #[serde(default)]
    pub bpm_stats: BpmStats,
}

impl BuildPlaylistResponse {
    /// Checks the invariants a well-formed reply must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.playlist_id.0.trim().is_empty() {
            return Err("playlist_id is empty".into());
        }
        if self.bpm_stats.kept > self.bpm_stats.total_input {
            return Err(format!(
                "bpm_stats.kept ({}) exceeds bpm_stats.total_input ({})",
                self.bpm_stats.kept, self.bpm_stats.total_input
            ));
        }
        if !self.min_bpm.is_finite() || !self.max_bpm.is_finite() {
            return Err("tempo bounds are not finite".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
}

impl PingResponse {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
