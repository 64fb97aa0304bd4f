// SPDX-License-Identifier: MPL-2.0

mod client;
mod types;

pub use client::ApiClient;
pub use types::{Friend, MediaKind, Post, PostMedia, PostRecord, Profile, Song};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed with status {0}: {1}")]
    Http(u16, String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("not found")]
    NotFound,
    #[error("not authenticated")]
    NotAuthenticated,
}
