#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the green cover backend.
//!
//! The backend computes per-sector green cover from satellite tiles and
//! serves it over a small REST API. [`SectorApi`] is the seam the rest of
//! the workspace programs against; [`SectorClient`] is its `reqwest`
//! implementation.
//!
//! Requests are issued once: there is no retry or backoff. A failed call
//! surfaces its [`ClientError`] to the caller.

use std::time::Duration;

use async_trait::async_trait;
use green_cover_sector_models::SectorId;
use green_cover_sector_models::api::{
    AllSectorsResponse, ClearCacheResponse, ErrorResponse, GreenCoverResponse,
};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default per-request timeout. Computing every sector from scratch takes
/// the backend several minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors from backend calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot be used to build endpoint URLs.
    #[error("Invalid backend URL {url:?}: {message}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// The backend answered with a non-2xx status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or a generic description.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

impl ClientError {
    /// Message suitable for showing to a user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Operations the dashboard needs from the backend.
#[async_trait]
pub trait SectorApi: Send + Sync {
    /// `GET /api/all-sectors`: geometry and stats for every sector.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails.
    async fn all_sectors(&self) -> Result<AllSectorsResponse, ClientError>;

    /// `GET /api/green-cover/{sector}`: green cover of one sector.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or decoding fails, including
    /// when the backend cannot find the sector.
    async fn green_cover(&self, sector: SectorId) -> Result<GreenCoverResponse, ClientError>;

    /// `GET /api/clear-cache`: drops the backend's all-sectors cache.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    async fn clear_cache(&self) -> Result<(), ClientError>;
}

/// `reqwest`-backed [`SectorApi`].
#[derive(Debug, Clone)]
pub struct SectorClient {
    client: reqwest::Client,
    base_url: Url,
}

impl SectorClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if `base_url` is not an absolute HTTP URL or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Creates a client that reuses an existing `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` cannot be a base
    /// for endpoint paths.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                message: "expected an http(s) base URL".to_string(),
            });
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// The backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/api/{segments...}`, percent-encoding each segment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the base URL cannot carry a
    /// path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        log::debug!("GET {url}");
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        decode_body(url.as_str(), status, &body)
    }
}

#[async_trait]
impl SectorApi for SectorClient {
    async fn all_sectors(&self) -> Result<AllSectorsResponse, ClientError> {
        let url = self.endpoint(&["all-sectors"])?;
        let response: AllSectorsResponse = self.get_json(url).await?;
        if !response.failed_sectors.is_empty() {
            log::warn!(
                "Backend could not compute {} sectors: {}",
                response.failed_sectors.len(),
                sector_list(&response.failed_sectors)
            );
        }
        Ok(response)
    }

    async fn green_cover(&self, sector: SectorId) -> Result<GreenCoverResponse, ClientError> {
        let url = self.endpoint(&["green-cover", &sector.display_name()])?;
        self.get_json(url).await
    }

    async fn clear_cache(&self) -> Result<(), ClientError> {
        let url = self.endpoint(&["clear-cache"])?;
        let response: ClearCacheResponse = self.get_json(url).await?;
        if let Some(message) = response.message {
            log::info!("Backend cache cleared: {message}");
        }
        Ok(())
    }
}

/// Turns a raw response into a typed body or a [`ClientError`].
///
/// Non-2xx statuses become [`ClientError::Status`] carrying the backend's
/// `error` message when the body has one.
///
/// # Errors
///
/// Returns [`ClientError::Status`] for non-2xx statuses and
/// [`ClientError::Decode`] when the body does not match `T`.
pub fn decode_body<T: DeserializeOwned>(
    url: &str,
    status: StatusCode,
    body: &str,
) -> Result<T, ClientError> {
    if !status.is_success() {
        let message = error_message(body).unwrap_or_else(|| {
            format!(
                "Request failed with status {}",
                status.canonical_reason().unwrap_or("unknown")
            )
        });
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(body).map_err(|e| ClientError::Decode {
        message: format!("Failed to parse response from {url}: {e}"),
    })
}

/// Joins sector display names with `", "`.
#[must_use]
pub fn sector_list(sectors: &[SectorId]) -> String {
    sectors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extracts the `error` field of a backend error body.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| e.error)
        .filter(|e| !e.is_empty())
}
