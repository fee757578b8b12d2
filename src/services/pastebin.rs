// src/services/pastebin.rs

//! Pastebin scraping API client.
//!
//! Two calls: the recent-pastes listing (`?limit=N`, JSON array) and the raw
//! paste (`<item_url><key>`). Listing outcomes are classified into a
//! [`BatchResponse`]; paste fetch errors are returned to the caller, which
//! skips the paste.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{BatchResponse, CrawlerConfig, PasteRef};
use crate::utils::http::{HtmlText, TextExtractor, create_async_client};

/// Substring the scraping API returns instead of JSON for non-whitelisted IPs.
pub const ACCESS_DENIED_MARKER: &str = "DOES NOT HAVE ACCESS";

/// Source of recent pastes and their text.
#[async_trait]
pub trait PasteSource: Send + Sync {
    /// Fetch up to `limit` recent paste records.
    async fn fetch_batch(&self, limit: usize) -> BatchResponse;

    /// Fetch one paste and return its extracted text.
    async fn fetch_content(&self, key: &str) -> Result<String>;

    /// Public URL of a paste, as written to match logs.
    fn paste_url(&self, key: &str) -> String;
}

/// [`PasteSource`] backed by the Pastebin scraping API.
pub struct PastebinClient {
    client: Client,
    scraping_url: String,
    item_url: String,
    extractor: Box<dyn TextExtractor>,
}

impl PastebinClient {
    /// Create a client with the default HTML text extractor.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Self::with_extractor(config, Box::new(HtmlText))
    }

    /// Create a client with a custom text extractor.
    pub fn with_extractor(config: &CrawlerConfig, extractor: Box<dyn TextExtractor>) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            scraping_url: config.scraping_url.clone(),
            item_url: config.item_url.clone(),
            extractor,
        })
    }

    async fn get_text(&self, url: &str, query: Option<(&str, String)>) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(pair) = query {
            request = request.query(&[pair]);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Classify a listing response body.
pub fn classify_batch_body(body: &str) -> BatchResponse {
    if body.contains(ACCESS_DENIED_MARKER) {
        return BatchResponse::AccessDenied;
    }
    match serde_json::from_str::<Vec<PasteRef>>(body) {
        Ok(pastes) => BatchResponse::Ok(pastes),
        Err(e) => BatchResponse::ConnectionFail(format!("malformed listing: {e}")),
    }
}

/// Classify a transport-level failure of the listing call.
fn classify_batch_error(error: AppError) -> BatchResponse {
    match error {
        // Error statuses (429, 5xx) count as connection failures.
        AppError::Http(e) if e.is_decode() => BatchResponse::OtherError(e.to_string()),
        other => BatchResponse::ConnectionFail(other.to_string()),
    }
}

#[async_trait]
impl PasteSource for PastebinClient {
    async fn fetch_batch(&self, limit: usize) -> BatchResponse {
        log::debug!("GET {} limit={}", self.scraping_url, limit);
        match self
            .get_text(&self.scraping_url, Some(("limit", limit.to_string())))
            .await
        {
            Ok(body) => classify_batch_body(&body),
            Err(e) => classify_batch_error(e),
        }
    }

    async fn fetch_content(&self, key: &str) -> Result<String> {
        let url = self.paste_url(key);
        log::debug!("GET {}", url);
        let body = self.get_text(&url, None).await?;
        self.extractor.extract(&body)
    }

    fn paste_url(&self, key: &str) -> String {
        format!("{}{}", self.item_url, key)
    }
}
