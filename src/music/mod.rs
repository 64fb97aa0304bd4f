// SPDX-License-Identifier: MPL-2.0

mod auth;
mod client;
mod types;

pub use auth::{AuthOutcome, Authenticator, BrowserFlow, LoopbackFlow, get_url_param};
pub use client::MusicClient;
pub use types::{Track, TrackArtist};

use crate::state::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MusicError {
    #[error("no stored credential")]
    Absent,
    #[error("stored credential expired")]
    Expired,
    #[error("an authorization flow is already in progress")]
    AlreadyInProgress,
    #[error("service rejected the credential")]
    RemoteRejected,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid authorization callback: {0}")]
    InvalidCallback(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}
