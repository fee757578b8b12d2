// src/models/paste.rs

use serde::{Deserialize, Serialize};

/// One record of the scraping feed's recent-pastes listing.
///
/// Only `key` is required; the remaining fields are kept when the feed
/// provides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteRef {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub syntax: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

impl PasteRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: None,
            syntax: None,
            user: None,
        }
    }
}

/// Outcome class of a batch fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    AccessDenied,
    ConnectionFail,
    OtherError,
}

/// A batch fetch result; pastes are only present on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResponse {
    Ok(Vec<PasteRef>),
    AccessDenied,
    ConnectionFail(String),
    OtherError(String),
}

impl BatchResponse {
    pub fn status(&self) -> FetchStatus {
        match self {
            Self::Ok(_) => FetchStatus::Ok,
            Self::AccessDenied => FetchStatus::AccessDenied,
            Self::ConnectionFail(_) => FetchStatus::ConnectionFail,
            Self::OtherError(_) => FetchStatus::OtherError,
        }
    }
}
