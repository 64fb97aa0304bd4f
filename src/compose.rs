// SPDX-License-Identifier: MPL-2.0

use crate::api::{ApiClient, ApiError, MediaKind, Post, PostMedia, PostRecord, Song};
use crate::config::{IMAGE_FOLDER, VIDEO_FOLDER};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("add text, pick a file, or select a song before posting")]
    Empty,
    #[error("could not read media file: {0}")]
    Media(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A post under composition. Holds the draft across a failed submit so the
/// user can retry without losing anything.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    /// Set when editing an existing post.
    pub id: Option<i64>,
    pub owner_id: String,
    pub body: String,
    pub media: Option<PostMedia>,
    pub song: Option<Song>,
}

impl PostDraft {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Self::default()
        }
    }

    /// Load an existing post into the composer for editing.
    pub fn edit(post: &Post) -> Self {
        Self {
            id: Some(post.id),
            owner_id: post.owner_id.clone(),
            body: post.body.clone(),
            media: post.media(),
            song: post.song.clone(),
        }
    }

    /// A post needs at least one of text, media, or a song.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.body.is_empty() && self.media.is_none() && self.song.is_none() {
            return Err(DraftError::Empty);
        }
        Ok(())
    }

    /// Upload any locally-picked media, then insert or update the post row.
    /// Returns the stored post.
    pub async fn submit(&self, api: &ApiClient) -> Result<Post, DraftError> {
        self.validate()?;

        let file = match &self.media {
            Some(PostMedia::Local { uri, kind }) => {
                let bytes = std::fs::read(uri).map_err(|e| DraftError::Media(e.to_string()))?;
                let path = api
                    .upload_file(folder_for(*kind), bytes, content_type_for(*kind))
                    .await?;
                debug!(%path, "uploaded draft media");
                Some(path)
            }
            Some(PostMedia::Remote { path }) => Some(path.clone()),
            None => None,
        };

        let record = PostRecord {
            user_id: self.owner_id.clone(),
            body: self.body.clone(),
            file,
            song: self.song.clone(),
        };

        let post = match self.id {
            Some(id) => api.update_post(id, &record).await?,
            None => api.create_post(&record).await?,
        };
        Ok(post)
    }
}

fn folder_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => IMAGE_FOLDER,
        MediaKind::Video => VIDEO_FOLDER,
    }
}

fn content_type_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image/jpeg",
        MediaKind::Video => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn stored_post_json(id: i64, file: Option<&str>) -> String {
        serde_json::json!([{
            "id": id,
            "user_id": "u1",
            "body": "hello",
            "file": file,
            "song": null,
            "created_at": "2026-08-06T12:00:00Z",
        }])
        .to_string()
    }

    fn json_response(body: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
        let header =
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
        tiny_http::Response::from_string(body).with_header(header)
    }

    #[test]
    fn test_empty_draft_is_rejected() {
        let draft = PostDraft::new("u1");
        assert!(matches!(draft.validate(), Err(DraftError::Empty)));
    }

    #[test]
    fn test_song_alone_is_enough() {
        let mut draft = PostDraft::new("u1");
        draft.song = Some(Song {
            name: "Hello".to_string(),
            artist: "Adele".to_string(),
            uri: "spotify:track:t1".to_string(),
        });
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_edit_carries_the_stored_post_into_the_draft() {
        let post: Post = serde_json::from_str(
            r#"{
                "id": 7,
                "user_id": "u1",
                "body": "old body",
                "file": "postImages/1.jpeg",
                "song": null,
                "created_at": "2026-08-06T12:00:00Z"
            }"#,
        )
        .unwrap();

        let draft = PostDraft::edit(&post);
        assert_eq!(draft.id, Some(7));
        assert_eq!(draft.body, "old body");
        assert_eq!(
            draft.media,
            Some(PostMedia::Remote {
                path: "postImages/1.jpeg".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_submit_empty_draft_never_touches_the_network() {
        let api = ApiClient::new("http://127.0.0.1:1", "anon-key");
        let draft = PostDraft::new("u1");
        assert!(matches!(draft.submit(&api).await, Err(DraftError::Empty)));
    }

    #[tokio::test]
    async fn test_submit_keeps_remote_media_without_reupload() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            // A single request: the insert. No storage call for remote media.
            let mut request = server.recv().unwrap();
            assert!(request.url().starts_with("/rest/v1/posts"));
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(sent["file"], "postImages/1.jpeg");
            request
                .respond(json_response(&stored_post_json(8, Some("postImages/1.jpeg"))))
                .unwrap();
        });

        let api = ApiClient::new(&format!("http://127.0.0.1:{port}"), "anon-key");
        let mut draft = PostDraft::new("u1");
        draft.body = "hello".to_string();
        draft.media = Some(PostMedia::Remote {
            path: "postImages/1.jpeg".to_string(),
        });

        let post = draft.submit(&api).await.unwrap();
        handle.join().unwrap();
        assert_eq!(post.id, 8);
    }

    #[tokio::test]
    async fn test_submit_uploads_local_media_first() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.mp4");
        std::fs::write(&clip, b"mp4-bytes").unwrap();

        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            // First the storage upload, then the insert referencing it.
            let mut upload = server.recv().unwrap();
            assert!(upload
                .url()
                .starts_with("/storage/v1/object/uploads/postVideos/"));
            let mut bytes = Vec::new();
            upload.as_reader().read_to_end(&mut bytes).unwrap();
            assert_eq!(bytes, b"mp4-bytes");
            upload.respond(json_response("{}")).unwrap();

            let mut insert = server.recv().unwrap();
            let mut body = String::new();
            insert.as_reader().read_to_string(&mut body).unwrap();
            let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
            let file = sent["file"].as_str().unwrap();
            assert!(file.starts_with("postVideos/"));
            assert!(file.ends_with(".mp4"));
            insert
                .respond(json_response(&stored_post_json(9, Some(file))))
                .unwrap();
        });

        let api = ApiClient::new(&format!("http://127.0.0.1:{port}"), "anon-key");
        let mut draft = PostDraft::new("u1");
        draft.body = "hello".to_string();
        draft.media = Some(PostMedia::Local {
            uri: clip.to_string_lossy().into_owned(),
            kind: MediaKind::Video,
        });

        let post = draft.submit(&api).await.unwrap();
        handle.join().unwrap();
        assert_eq!(post.id, 9);
        assert!(post.file.unwrap().starts_with("postVideos/"));
    }

    #[tokio::test]
    async fn test_submit_with_id_updates_instead_of_inserting() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            let request = server.recv().unwrap();
            assert_eq!(request.method(), &tiny_http::Method::Patch);
            assert!(request.url().contains("id=eq.7"));
            request
                .respond(json_response(&stored_post_json(7, None)))
                .unwrap();
        });

        let api = ApiClient::new(&format!("http://127.0.0.1:{port}"), "anon-key");
        let mut draft = PostDraft::new("u1");
        draft.id = Some(7);
        draft.body = "edited".to_string();

        let post = draft.submit(&api).await.unwrap();
        handle.join().unwrap();
        assert_eq!(post.id, 7);
    }
}
