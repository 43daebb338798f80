use shared::domain::{BpmBound, LocalPlaylist};
use tracing::warn;

use crate::{
    error::BuildError,
    playlist_client::{prepare_request, PlaylistBuildClient},
    store::PlaylistStore,
};

/// One signed-in user's playlist screen state: the build client plus the
/// local list it feeds.
///
/// `submit` takes `&mut self`, so a session never has two builds in flight.
#[derive(Debug)]
pub struct PlaylistSession {
    client: PlaylistBuildClient,
    store: PlaylistStore,
    user_id: String,
}

impl PlaylistSession {
    pub fn new(client: PlaylistBuildClient, user_id: impl Into<String>) -> Self {
        Self {
            client,
            store: PlaylistStore::new(),
            user_id: user_id.into(),
        }
    }

    pub fn client(&self) -> &PlaylistBuildClient {
        &self.client
    }

    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Builds remotely and, only on success, appends the result locally.
    pub async fn submit(
        &mut self,
        name: &str,
        min_bpm_text: &str,
        max_bpm_text: &str,
        queries: &[String],
    ) -> Result<&LocalPlaylist, BuildError> {
        let outcome = match prepare_request(
            name,
            min_bpm_text,
            max_bpm_text,
            &self.user_id,
            queries,
        ) {
            Ok(request) => self
                .client
                .submit(&request)
                .await
                .map(|response| (request.name, response)),
            Err(err) => Err(err),
        };

        match outcome {
            Ok((name, response)) => Ok(self.store.add_built(name, &response)),
            Err(err) => {
                warn!(kind = ?err.kind(), error = %err, "session: build failed, store untouched");
                Err(err)
            }
        }
    }

    /// Quick-add from the picker form without contacting the service.
    pub fn add_local(
        &mut self,
        name: &str,
        min_bpm: impl Into<BpmBound>,
        max_bpm: impl Into<BpmBound>,
    ) -> &LocalPlaylist {
        self.store.add(name, min_bpm, max_bpm)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
