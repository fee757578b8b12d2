// src/utils/http.rs

//! HTTP client utilities and HTML-to-text extraction.

use std::time::Duration;

use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// The request timeout is always finite so a hung connection surfaces as a
/// transport error instead of blocking the poll loop.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .build()?;
    Ok(client)
}

/// Turns a raw paste response body into the plain text rules are matched against.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, body: &str) -> Result<String>;
}

/// Extracts the text nodes of an HTML document, in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlText;

impl TextExtractor for HtmlText {
    fn extract(&self, body: &str) -> Result<String> {
        if body.contains('\0') {
            return Err(AppError::extract("body contains NUL bytes"));
        }
        let document = Html::parse_document(body);
        Ok(document.root_element().text().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_body_passes_through() {
        let text = HtmlText.extract("SECRET DATA HERE").unwrap();
        assert_eq!(text, "SECRET DATA HERE");
    }

    #[test]
    fn test_markup_is_stripped() {
        let html = "<html><body><p>user: admin</p><p>pass: hunter2</p></body></html>";
        let text = HtmlText.extract(html).unwrap();
        assert_eq!(text, "user: adminpass: hunter2");
    }

    #[test]
    fn test_entities_are_decoded() {
        let text = HtmlText.extract("a &lt; b &amp;&amp; c").unwrap();
        assert_eq!(text, "a < b && c");
    }

    #[test]
    fn test_nul_bytes_are_rejected() {
        assert!(HtmlText.extract("bin\0ary").is_err());
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(create_async_client(&CrawlerConfig::default()).is_ok());
    }
}
