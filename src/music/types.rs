// SPDX-License-Identifier: MPL-2.0

use crate::api::Song;
use serde::Deserialize;

/// Catalog search response, decoupled from the provider's full track object.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackPage {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

impl Track {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }

    /// The shape a selected track takes inside a post.
    pub fn to_song(&self) -> Song {
        Song {
            name: self.name.clone(),
            artist: self.primary_artist().to_string(),
            uri: self.uri.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_artist_is_the_first_listed() {
        let track: Track = serde_json::from_str(
            r#"{
                "id": "t1",
                "name": "Duet",
                "uri": "spotify:track:t1",
                "artists": [{"name": "First"}, {"name": "Second"}]
            }"#,
        )
        .unwrap();
        assert_eq!(track.primary_artist(), "First");

        let song = track.to_song();
        assert_eq!(song.name, "Duet");
        assert_eq!(song.artist, "First");
        assert_eq!(song.uri, "spotify:track:t1");
    }

    #[test]
    fn test_track_without_artists_deserializes() {
        let track: Track =
            serde_json::from_str(r#"{"id": "t1", "name": "Solo", "uri": "spotify:track:t1"}"#)
                .unwrap();
        assert_eq!(track.primary_artist(), "");
    }
}
