// SPDX-License-Identifier: MPL-2.0

use crate::api::{ApiClient, ApiError, Post};
use crate::config::PAGE_STEP;
use tracing::debug;

/// Where the controller gets its posts. [`ApiClient`] is the production
/// source; tests substitute an in-memory one.
#[allow(async_fn_in_trait)]
pub trait PostSource {
    /// Up to `limit` posts for the owner, newest-first with a deterministic
    /// ordering key.
    async fn recent_posts(&self, owner_id: &str, limit: u32) -> Result<Vec<Post>, ApiError>;
}

impl PostSource for ApiClient {
    async fn recent_posts(&self, owner_id: &str, limit: u32) -> Result<Vec<Post>, ApiError> {
        self.posts(owner_id, Some(limit)).await
    }
}

/// Result of a [`FeedController::load_more`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The feed was refreshed; carries the number of posts now held.
    Loaded(usize),
    /// The feed is exhausted; the data source was not called.
    NoMore,
}

/// Incremental loader for one user's feed.
///
/// Each fetch widens the request window by a fixed step and replaces the held
/// sequence with the server's newest-first ordering. The feed is exhausted
/// once a fetch returns no more posts than were already held. The window
/// counter belongs to this instance alone and starts at zero, so pagination
/// state never leaks between feed views.
pub struct FeedController {
    owner_id: String,
    items: Vec<Post>,
    requested: u32,
    has_more: bool,
}

impl FeedController {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            items: Vec::new(),
            requested: 0,
            has_more: true,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn posts(&self) -> &[Post] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Point the controller at a new owner, dropping all pagination state.
    pub fn reset(&mut self, owner_id: impl Into<String>) {
        self.owner_id = owner_id.into();
        self.items.clear();
        self.requested = 0;
        self.has_more = true;
    }

    /// Fetch the next window of posts.
    ///
    /// The window grows before the fetch, so a failed attempt retries with
    /// the larger window; `items` and `has_more` only change on success.
    /// Exhaustion compares the returned length against the previously held
    /// length, not against the requested window.
    pub async fn load_more<S: PostSource>(&mut self, source: &S) -> Result<LoadOutcome, ApiError> {
        if !self.has_more {
            return Ok(LoadOutcome::NoMore);
        }

        self.requested += PAGE_STEP;
        debug!(owner = %self.owner_id, limit = self.requested, "fetching posts");
        let posts = source.recent_posts(&self.owner_id, self.requested).await?;

        if posts.len() == self.items.len() {
            self.has_more = false;
        }
        self.items = posts;
        Ok(LoadOutcome::Loaded(self.items.len()))
    }
}
