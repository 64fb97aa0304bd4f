// SPDX-License-Identifier: MPL-2.0

//! Headless client core for Duet, a social music-sharing app.
//!
//! The crate owns the non-UI half of the client: the backend API boundary,
//! the Spotify session and catalog integration, feed pagination, and post
//! composition. A shell (mobile or desktop) renders on top of these modules.

pub mod api;
pub mod compose;
pub mod config;
pub mod feed;
pub mod music;
pub mod runtime;
pub mod state;

pub use api::{ApiClient, ApiError, Friend, MediaKind, Post, PostMedia, Profile, Song};
pub use compose::{DraftError, PostDraft};
pub use feed::{FeedController, LoadOutcome, PostSource};
pub use music::{
    AuthOutcome, Authenticator, BrowserFlow, LoopbackFlow, MusicClient, MusicError, get_url_param,
};
pub use state::{SessionError, StoredToken, TokenStatus, TokenStore};
