// SPDX-License-Identifier: MPL-2.0

use crate::config::CATALOG_URL;
use crate::music::MusicError;
use crate::music::types::{SearchResponse, Track};
use crate::state::{TokenStatus, TokenStore};
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use tracing::debug;

static HTTP: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Bearer-authenticated client for the music catalog.
///
/// Every request validates the stored token first; a missing or expired
/// credential fails locally so the shell can prompt re-authorization instead
/// of burning a doomed network round trip.
pub struct MusicClient {
    store: TokenStore,
    api_url: String,
}

impl MusicClient {
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            api_url: CATALOG_URL.to_string(),
        }
    }

    pub fn with_service(store: TokenStore, api_url: &str) -> Self {
        Self {
            store,
            api_url: api_url.to_string(),
        }
    }

    /// Search the catalog for tracks matching a free-text query.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, MusicError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let token = match self.store.status()? {
            TokenStatus::Valid(token) => token,
            TokenStatus::Expired => return Err(MusicError::Expired),
            TokenStatus::Absent => return Err(MusicError::Absent),
        };

        debug!(query, limit, "searching catalog");
        let limit = limit.to_string();
        let response = HTTP
            .get(format!("{}/search", self.api_url))
            .bearer_auth(&token.access_token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| MusicError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Locally the token looked fine; the service disagreed.
            return Err(MusicError::RemoteRejected);
        }
        if !status.is_success() {
            return Err(MusicError::Transport(format!(
                "search failed with status {status}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| MusicError::InvalidResponse(e.to_string()))?;
        Ok(parsed.tracks.items)
    }
}
