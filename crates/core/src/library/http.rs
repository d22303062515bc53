//! HTTP implementation of the media library collaborators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::MediaServerConfig;

use super::traits::{ChapterAnalysis, MediaLibrary};
use super::types::{ExtractFilter, ExtractOptions, LibraryError, MediaKind, WorkItem};

/// A user known to the host, cached for scope resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto {
    id: String,
    name: String,
    path: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    has_primary_image: bool,
    #[serde(default)]
    lightweight: bool,
    #[serde(default)]
    has_media_stream: bool,
}

impl From<ItemDto> for WorkItem {
    fn from(dto: ItemDto) -> Self {
        let kind = match dto.kind.as_deref() {
            Some("episode") => MediaKind::Episode,
            Some("movie") => MediaKind::Movie,
            _ => MediaKind::Other,
        };
        WorkItem {
            id: dto.id,
            name: dto.name,
            path: dto.path,
            kind,
            has_primary_image: dto.has_primary_image,
            lightweight: dto.lightweight,
            has_media_stream: dto.has_media_stream,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatternDto {
    detected: bool,
}

/// Media library client talking to the host server's REST API.
pub struct HttpLibraryClient {
    client: Client,
    config: MediaServerConfig,
    /// Cached user roster, reloaded on user lifecycle events.
    users: RwLock<Vec<UserDto>>,
}

impl HttpLibraryClient {
    /// Create a new client from the media server config.
    pub fn new(config: MediaServerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            users: RwLock::new(Vec::new()),
        }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// The currently cached user roster.
    pub async fn users(&self) -> Vec<UserDto> {
        self.users.read().await.clone()
    }

    fn map_send_error(e: reqwest::Error) -> LibraryError {
        if e.is_timeout() {
            LibraryError::Timeout
        } else if e.is_connect() {
            LibraryError::ConnectionFailed(e.to_string())
        } else {
            LibraryError::Api(e.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LibraryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LibraryError::Api(format!(
            "HTTP {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )))
    }

    /// Issue a POST against an item operation endpoint, racing cancellation.
    async fn post_item_op(
        &self,
        item: &WorkItem,
        op: &str,
        body: serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError> {
        let url = format!("{}/api/items/{}/{}", self.base_url(), item.id, op);
        let request = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.config.api_key)
            .json(&body)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(LibraryError::Cancelled),
            result = request => result.map_err(Self::map_send_error)?,
        };

        Self::check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaLibrary for HttpLibraryClient {
    async fn fetch_pending(&self, filter: &ExtractFilter) -> Result<Vec<WorkItem>, LibraryError> {
        let url = format!("{}/api/items/pending-extraction", self.base_url());
        let mut request = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.config.api_key)
            .query(&[("lightweightOnly", filter.lightweight_only.to_string())]);

        if !filter.library_scope.is_empty() {
            request = request.query(&[("libraries", filter.library_scope.join(","))]);
        }

        let response = request.send().await.map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;

        let items: Vec<ItemDto> = response
            .json()
            .await
            .map_err(|e| LibraryError::Decode(e.to_string()))?;

        debug!("Fetched {} pending extraction items", items.len());
        Ok(items.into_iter().map(WorkItem::from).collect())
    }

    async fn probe(
        &self,
        item: &WorkItem,
        options: &ExtractOptions,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError> {
        self.post_item_op(
            item,
            "probe",
            serde_json::json!({
                "exclusive": options.exclusive,
                "relaxedTimeouts": options.relaxed_timeouts,
            }),
            cancel,
        )
        .await
    }

    async fn capture_refresh(
        &self,
        item: &WorkItem,
        options: &ExtractOptions,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError> {
        self.post_item_op(
            item,
            "capture",
            serde_json::json!({
                "exclusive": options.exclusive,
                "relaxedTimeouts": options.relaxed_timeouts,
                "captureLightweight": options.capture_lightweight,
            }),
            cancel,
        )
        .await
    }

    async fn refresh_users(&self) -> Result<(), LibraryError> {
        let url = format!("{}/api/users", self.base_url());
        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;

        let users: Vec<UserDto> = response
            .json()
            .await
            .map_err(|e| LibraryError::Decode(e.to_string()))?;

        debug!("Refreshed user roster: {} users", users.len());
        *self.users.write().await = users;
        Ok(())
    }
}

#[async_trait]
impl ChapterAnalysis for HttpLibraryClient {
    async fn has_intro_credits_pattern(&self, item: &WorkItem) -> bool {
        let url = format!(
            "{}/api/items/{}/chapters/pattern",
            self.base_url(),
            item.id
        );
        let result = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Chapter pattern lookup failed for {}: {}", item.id, e);
                return false;
            }
        };

        match Self::check_status(response).await {
            Ok(r) => match r.json::<PatternDto>().await {
                Ok(p) => p.detected,
                Err(e) => {
                    warn!("Chapter pattern decode failed for {}: {}", item.id, e);
                    false
                }
            },
            Err(e) => {
                warn!("Chapter pattern lookup failed for {}: {}", item.id, e);
                false
            }
        }
    }
}
