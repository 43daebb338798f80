//! Client for the remote playlist-building service.

use std::time::Duration;

use reqwest::Client;
use shared::{
    domain::{format_bpm, UserId},
    protocol::{
        BuildPlaylistRequest, BuildPlaylistResponse, PingResponse, BUILD_PLAYLIST_PATH, PING_PATH,
    },
};
use tracing::{info, warn};
use url::Url;

use crate::{
    config::{normalize_service_url, Settings},
    error::BuildError,
};

pub const DEFAULT_PLAYLIST_NAME: &str = "BPM Playlist";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Issues one `POST /build_playlist` per call under a hard timeout.
///
/// Concurrent calls with the same input are not coalesced; callers that need
/// at-most-one-in-flight go through [`crate::PlaylistSession`].
#[derive(Debug, Clone)]
pub struct PlaylistBuildClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl PlaylistBuildClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        anyhow::ensure!(!timeout.is_zero(), "request timeout must be greater than zero");
        // Url::join drops the last path segment unless it ends with '/'.
        let base = format!("{}/", normalize_service_url(base_url));
        let base_url = Url::parse(&base)
            .map_err(|err| anyhow::anyhow!("invalid playlist service url '{base_url}': {err}"))?;
        Ok(Self {
            http: Client::new(),
            base_url,
            timeout,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(&settings.service_url, settings.request_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Validates the form input, then submits it.
    pub async fn build(
        &self,
        name: &str,
        min_bpm_text: &str,
        max_bpm_text: &str,
        user_id: &str,
        queries: &[String],
    ) -> Result<BuildPlaylistResponse, BuildError> {
        let request = prepare_request(name, min_bpm_text, max_bpm_text, user_id, queries)?;
        self.submit(&request).await
    }

    /// Sends an already validated request exactly once.
    pub async fn submit(
        &self,
        request: &BuildPlaylistRequest,
    ) -> Result<BuildPlaylistResponse, BuildError> {
        let url = self.endpoint(BUILD_PLAYLIST_PATH)?;
        info!(
            url = %url,
            name = %request.name,
            min_bpm = request.min_bpm,
            max_bpm = request.max_bpm,
            queries = request.queries.len(),
            "playlist: submitting build"
        );

        // Dropping the in-flight future on timeout aborts the request, so
        // nothing from it can surface afterwards.
        let exchange = async {
            let res = self
                .http
                .post(url)
                .json(request)
                .send()
                .await
                .map_err(|err| self.map_send_error(err))?;
            let status = res.status();
            let body = res.text().await;
            Ok::<_, BuildError>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(outcome) => outcome?,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "playlist: build timed out");
                return Err(BuildError::Timeout(self.timeout));
            }
        };

        if !status.is_success() {
            let body = body.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "playlist: service rejected build");
            return Err(BuildError::Remote { status, body });
        }

        let body = body.map_err(|err| BuildError::Protocol(format!("unreadable body: {err}")))?;
        let response = parse_build_response(&body)?;
        info!(
            playlist_id = %response.playlist_id,
            added_count = response.added_count,
            fell_back = response.fell_back,
            kept = response.bpm_stats.kept,
            total_input = response.bpm_stats.total_input,
            "playlist: build succeeded"
        );
        Ok(response)
    }

    /// `GET /ping`; `Ok(())` when the service reports itself healthy.
    pub async fn ping(&self) -> Result<(), BuildError> {
        let url = self.endpoint(PING_PATH)?;
        let exchange = async {
            let res = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|err| self.map_send_error(err))?;
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Ok::<_, BuildError>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| BuildError::Timeout(self.timeout))??;
        if !status.is_success() {
            return Err(BuildError::Remote { status, body });
        }

        let ping: PingResponse = serde_json::from_str(&body)
            .map_err(|err| BuildError::Protocol(format!("invalid ping body: {err}")))?;
        if !ping.is_ok() {
            return Err(BuildError::Protocol(format!(
                "service reported status '{}'",
                ping.status
            )));
        }
        Ok(())
    }

    fn map_send_error(&self, err: reqwest::Error) -> BuildError {
        if err.is_timeout() {
            BuildError::Timeout(self.timeout)
        } else {
            BuildError::Transport(err.to_string())
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BuildError> {
        self.base_url
            .join(path)
            .map_err(|err| BuildError::Transport(format!("invalid endpoint url: {err}")))
    }
}

/// Turns raw form input into a request, or explains what is wrong with it.
pub fn prepare_request(
    name: &str,
    min_bpm_text: &str,
    max_bpm_text: &str,
    user_id: &str,
    queries: &[String],
) -> Result<BuildPlaylistRequest, BuildError> {
    let min_bpm = parse_bpm("minimum BPM", min_bpm_text)?;
    let max_bpm = parse_bpm("maximum BPM", max_bpm_text)?;
    if min_bpm >= max_bpm {
        return Err(BuildError::Input(format!(
            "minimum BPM ({}) must be below maximum BPM ({})",
            format_bpm(min_bpm),
            format_bpm(max_bpm)
        )));
    }

    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(BuildError::Input("user id is required".into()));
    }

    let queries: Vec<String> = queries
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();
    if queries.is_empty() {
        return Err(BuildError::Input("at least one search query is required".into()));
    }

    let name = match name.trim() {
        "" => DEFAULT_PLAYLIST_NAME.to_string(),
        trimmed => trimmed.to_string(),
    };

    Ok(BuildPlaylistRequest {
        user_id: UserId(user_id.to_string()),
        name,
        queries,
        min_bpm,
        max_bpm,
        description: Some(describe_band(min_bpm, max_bpm)),
        is_public: Some(false),
    })
}

pub fn describe_band(min_bpm: f64, max_bpm: f64) -> String {
    format!(
        "Tracks between {} and {} BPM",
        format_bpm(min_bpm),
        format_bpm(max_bpm)
    )
}

fn parse_bpm(label: &str, text: &str) -> Result<f64, BuildError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| BuildError::Input(format!("{label} '{trimmed}' is not a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(BuildError::Input(format!(
            "{label} must be a positive number, got '{trimmed}'"
        )));
    }
    Ok(value)
}

pub fn parse_build_response(body: &str) -> Result<BuildPlaylistResponse, BuildError> {
    let response: BuildPlaylistResponse = serde_json::from_str(body)
        .map_err(|err| BuildError::Protocol(format!("invalid build response: {err}")))?;
    response.validate().map_err(BuildError::Protocol)?;
    Ok(response)
}

#[cfg(test)]
#[path = "tests/playlist_client_tests.rs"]
mod tests;
