// SPDX-License-Identifier: MPL-2.0

#![allow(dead_code)]

pub const APP_ID: &str = "io.github.duetsocial.Duet";
pub const APP_NAME: &str = "Duet";

/// Spotify implicit-grant endpoints and client registration.
pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const CATALOG_URL: &str = "https://api.spotify.com/v1";
pub const CLIENT_ID: &str = "c5edf098beca4efaae3699dcff8aede4";

/// Scopes requested during authorization, space-joined into the authorize URL.
pub const SCOPES: &[&str] = &[
    "user-read-email",
    "user-library-read",
    "user-read-recently-played",
    "user-top-read",
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
];

/// How many additional posts each feed fetch asks for.
pub const PAGE_STEP: u32 = 10;

/// Result cap for catalog searches.
pub const SEARCH_LIMIT: u32 = 10;

/// Storage folders for uploaded post media. The folder in a stored path is
/// what distinguishes an image reference from a video reference.
pub const IMAGE_FOLDER: &str = "postImages";
pub const VIDEO_FOLDER: &str = "postVideos";
