// SPDX-License-Identifier: MPL-2.0

use crate::api::ApiError;
use crate::api::types::{Friend, Post, PostRecord, Profile};
use serde::Deserialize;
use std::sync::RwLock;
use tracing::debug;

const STORAGE_BUCKET: &str = "uploads";

/// A friends row as the backend returns it, with the joined user record
/// embedded. Flattened into [`Friend`] before leaving this module.
#[derive(Debug, Deserialize)]
struct FriendRow {
    friend_id: String,
    status: String,
    users: FriendUser,
}

#[derive(Debug, Deserialize)]
struct FriendUser {
    name: String,
    image: Option<String>,
    username: String,
}

/// Typed boundary over the backend's REST surface (PostgREST + storage), so
/// the rest of the crate only sees our own types.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    auth: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            auth: RwLock::new(None),
        }
    }

    /// Attach the signed-in user's access token; requests fall back to the
    /// anonymous key when none is set.
    pub fn set_auth(&self, access_token: &str) {
        let mut auth = self.auth.write().unwrap();
        *auth = Some(access_token.to_string());
    }

    fn bearer(&self) -> String {
        self.auth
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| self.api_key.clone())
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer())
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Http(status.as_u16(), body))
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        Self::expect_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Fetch a single user record.
    pub async fn profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        let id_filter = format!("eq.{user_id}");
        let response = self
            .request(reqwest::Method::GET, self.rest_url("users"))
            .query(&[
                ("select", "id,username,name,image,bio"),
                ("id", id_filter.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let mut rows: Vec<Profile> = Self::read_json(response).await?;
        rows.pop().ok_or(ApiError::NotFound)
    }

    /// Fetch a user's accepted friends with their user records joined in.
    pub async fn accepted_friends(&self, user_id: &str) -> Result<Vec<Friend>, ApiError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .request(reqwest::Method::GET, self.rest_url("friends"))
            .query(&[
                ("select", "friend_id,status,users!friends_friend_id(name,image,username)"),
                ("user_id", user_filter.as_str()),
                ("status", "eq.accepted"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let rows: Vec<FriendRow> = Self::read_json(response).await?;
        Ok(rows
            .into_iter()
            .map(|row| Friend {
                id: row.friend_id,
                name: row.users.name,
                image: row.users.image,
                username: row.users.username,
                status: row.status,
            })
            .collect())
    }

    /// Count a user's accepted friends without fetching the rows.
    pub async fn friends_count(&self, user_id: &str) -> Result<u64, ApiError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .request(reqwest::Method::GET, self.rest_url("friends"))
            .query(&[
                ("select", "friend_id"),
                ("user_id", user_filter.as_str()),
                ("status", "eq.accepted"),
            ])
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let response = Self::expect_success(response).await?;
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::InvalidResponse("missing content-range".to_string()))?;

        // Header shape is "0-0/42" ("*/0" when empty).
        content_range
            .rsplit_once('/')
            .and_then(|(_, total)| total.parse().ok())
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!("unparsable content-range: {content_range}"))
            })
    }

    /// Fetch a user's posts newest-first. `limit` of `None` fetches the whole
    /// collection. Ordering is deterministic: creation timestamp descending,
    /// row id as tie-break.
    pub async fn posts(&self, owner_id: &str, limit: Option<u32>) -> Result<Vec<Post>, ApiError> {
        debug!(owner = owner_id, ?limit, "fetching posts");
        let mut query = vec![
            ("select".to_string(), "*".to_string()),
            ("user_id".to_string(), format!("eq.{owner_id}")),
            ("order".to_string(), "created_at.desc,id.desc".to_string()),
        ];
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }

        let response = self
            .request(reqwest::Method::GET, self.rest_url("posts"))
            .query(&query)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::read_json(response).await
    }

    /// Insert a new post and return the stored row.
    pub async fn create_post(&self, record: &PostRecord) -> Result<Post, ApiError> {
        let response = self
            .request(reqwest::Method::POST, self.rest_url("posts"))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let mut rows: Vec<Post> = Self::read_json(response).await?;
        rows.pop()
            .ok_or_else(|| ApiError::InvalidResponse("empty representation".to_string()))
    }

    /// Update an existing post and return the stored row.
    pub async fn update_post(&self, id: i64, record: &PostRecord) -> Result<Post, ApiError> {
        let response = self
            .request(reqwest::Method::PATCH, self.rest_url("posts"))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let mut rows: Vec<Post> = Self::read_json(response).await?;
        rows.pop()
            .ok_or_else(|| ApiError::InvalidResponse("empty representation".to_string()))
    }

    /// Upload media bytes into a storage folder and return the object path
    /// that a post row references.
    pub async fn upload_file(
        &self,
        folder: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError> {
        let extension = content_type.rsplit_once('/').map(|(_, e)| e).unwrap_or("bin");
        let name = format!("{}.{}", chrono::Utc::now().timestamp_millis(), extension);
        let path = format!("{folder}/{name}");

        let url = format!("{}/storage/v1/object/{STORAGE_BUCKET}/{path}", self.base_url);
        let response = self
            .request(reqwest::Method::POST, url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::expect_success(response).await?;
        Ok(path)
    }

    /// Revoke the signed-in user's backend session.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let token = self
            .auth
            .read()
            .unwrap()
            .clone()
            .ok_or(ApiError::NotAuthenticated)?;

        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::expect_success(response).await?;
        let mut auth = self.auth.write().unwrap();
        *auth = None;
        Ok(())
    }
}
