// SPDX-License-Identifier: MPL-2.0

use crate::config::IMAGE_FOLDER;
use serde::{Deserialize, Serialize};

/// A user record as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
}

/// An accepted friendship, flattened from the join row the backend returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Friend {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub username: String,
    pub status: String,
}

/// A track carried inside a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    pub artist: String,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A post attachment. `Local` is a device-picked asset that still needs an
/// upload; `Remote` is a storage reference already held by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostMedia {
    Local { uri: String, kind: MediaKind },
    Remote { path: String },
}

impl PostMedia {
    pub fn is_local(&self) -> bool {
        matches!(self, PostMedia::Local { .. })
    }

    /// A remote reference carries its kind in the storage folder it was
    /// uploaded to.
    pub fn kind(&self) -> MediaKind {
        match self {
            PostMedia::Local { kind, .. } => *kind,
            PostMedia::Remote { path } => {
                if path.contains(IMAGE_FOLDER) {
                    MediaKind::Image
                } else {
                    MediaKind::Video
                }
            }
        }
    }
}

/// A stored post. `created_at` is the server-side ordering key.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(rename = "user_id")]
    pub owner_id: String,
    #[serde(default)]
    pub body: String,
    pub file: Option<String>,
    pub song: Option<Song>,
    pub created_at: String,
}

impl Post {
    pub fn media(&self) -> Option<PostMedia> {
        self.file.as_ref().map(|path| PostMedia::Remote { path: path.clone() })
    }
}

/// The writable half of a post row, for inserts and updates.
#[derive(Debug, Clone, Serialize)]
pub struct PostRecord {
    pub user_id: String,
    pub body: String,
    pub file: Option<String>,
    pub song: Option<Song>,
}
