//! HTTP implementation of [`DataService`] using reqwest.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BoxFuture, DataService, ServiceError};
use crate::model::{GeoPoint, Location, NewTrack, Track, TrackId};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`HttpDataService`].
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// API root; endpoint paths are appended to it.
    pub base_url: String,
    /// Sent verbatim as a bearer token when present.
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`DataService`] backed by a JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDataService {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpDataService {
    /// Build a client from `config`.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let base = config.base_url.trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ServiceError::Config(format!(
                "base URL must start with http:// or https://: {}",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base.to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let url = response.url().to_string();
        debug!(%status, url = %url, "Service response");

        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(url));
        }
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

impl DataService for HttpDataService {
    fn list_tracks(&self) -> BoxFuture<'_, Result<Vec<Track>, ServiceError>> {
        Box::pin(self.send_json(self.request(Method::GET, "tracks")))
    }

    fn get_track(&self, id: TrackId) -> BoxFuture<'_, Result<Track, ServiceError>> {
        Box::pin(self.send_json(self.request(Method::GET, &format!("tracks/{}", id))))
    }

    fn create_track<'a>(
        &'a self,
        track: &'a NewTrack,
    ) -> BoxFuture<'a, Result<Track, ServiceError>> {
        Box::pin(async move {
            debug!(name = %track.name, points = track.points.len(), "Creating track");
            self.send_json(self.request(Method::POST, "tracks").json(track))
                .await
        })
    }

    fn delete_track(&self, id: TrackId) -> BoxFuture<'_, Result<(), ServiceError>> {
        Box::pin(async move {
            self.send(self.request(Method::DELETE, &format!("tracks/{}", id)))
                .await?;
            Ok(())
        })
    }

    fn list_locations(&self) -> BoxFuture<'_, Result<Vec<Location>, ServiceError>> {
        Box::pin(self.send_json(self.request(Method::GET, "locations")))
    }

    fn upsert_location<'a>(
        &'a self,
        point: &'a GeoPoint,
    ) -> BoxFuture<'a, Result<Location, ServiceError>> {
        Box::pin(self.send_json(self.request(Method::POST, "locations").json(point)))
    }

    fn append_track_point<'a>(
        &'a self,
        point: &'a GeoPoint,
    ) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            self.send(self.request(Method::POST, "track-points").json(point))
                .await?;
            Ok(())
        })
    }
}
