//! NodeImage API client
//!
//! Provides a typed HTTP client for the NodeImage listing endpoint and for
//! the direct download links it hands out.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nib_api::client::NodeImageClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = NodeImageClient::new("api-key-here");
//! let images = client.list_images().await?;
//! println!("{} images", images.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ApiError;

/// Default base URL of the NodeImage API
pub const DEFAULT_BASE_URL: &str = "https://api.nodeimage.com";

/// Path of the listing endpoint, relative to the base URL
const LIST_PATH: &str = "/api/v1/list";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Timeout for the listing request
pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single image download
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest error body kept in [`ApiError::Status`]
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// NodeImage API response types
// ============================================================================

/// Response from the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    /// Whether the request was accepted
    #[serde(default)]
    pub success: bool,
    /// Human-readable message, set on failure
    #[serde(default)]
    pub message: String,
    /// Images in the account, in service order
    #[serde(default)]
    pub images: Vec<ImageInfo>,
}

/// One image of the listing
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInfo {
    /// Opaque image identifier
    #[serde(rename = "image_id")]
    pub id: String,
    /// Stored filename
    pub filename: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Links to the image content
    #[serde(default)]
    pub links: ImageLinks,
}

/// Links section of an [`ImageInfo`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageLinks {
    /// Direct download link
    #[serde(default)]
    pub direct: String,
}

// ============================================================================
// NodeImageClient
// ============================================================================

/// HTTP client for NodeImage API calls
///
/// Wraps `reqwest::Client` with the API key header and base URL
/// construction. Cloning is cheap; the connection pool is shared.
#[derive(Clone)]
pub struct NodeImageClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// API key sent with listing requests
    api_key: String,
    /// Log the raw listing body at debug level
    log_raw_body: bool,
}

impl NodeImageClient {
    /// Creates a new client for the public NodeImage API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (useful for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            log_raw_body: false,
        }
    }

    /// Log the raw listing response body at debug level
    pub fn with_raw_body_logging(mut self, enabled: bool) -> Self {
        self.log_raw_body = enabled;
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Builds the authenticated listing request
    pub fn list_request(&self) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, LIST_PATH);
        self.client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(LIST_TIMEOUT)
    }

    /// Retrieves every image in the account
    ///
    /// Fails on transport errors, non-success statuses, malformed JSON and
    /// `success: false` answers. Nothing is retried.
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn list_images(&self) -> Result<Vec<ImageInfo>, ApiError> {
        debug!("Fetching image listing");

        let response = self.list_request().send().await?;
        let status = response.status();
        let body = response.text().await?;

        if self.log_raw_body {
            debug!(status = status.as_u16(), body = %body, "Raw listing response");
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let parsed: ListResponse = serde_json::from_str(&body)
            .map_err(|err| ApiError::InvalidResponse(format!("listing is not valid JSON: {err}")))?;

        if !parsed.success {
            warn!(message = %parsed.message, "Listing request rejected");
            return Err(ApiError::Rejected(parsed.message));
        }

        debug!(count = parsed.images.len(), "Listing received");
        Ok(parsed.images)
    }

    /// Starts downloading `url`
    ///
    /// Returns the response once a success status has been received; the body
    /// is read with [`Response::chunk`]. The API key is not sent, direct links
    /// are public.
    pub async fn start_download(&self, url: &str) -> Result<Response, ApiError> {
        debug!(url, "Starting download");

        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        Ok(response)
    }
}

fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
