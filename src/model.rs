//! Data models for the URL shortener
//!
//! `UrlMapping` is the only persisted entity. The remaining types are the
//! request and response shapes of the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored short code -> long URL mapping
///
/// Rows are immutable once written; the only way to change one is to delete
/// it and shorten again.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    /// Store-assigned identity, strictly increasing and never reused
    pub id: u64,

    /// Redirect target
    pub long_url: String,

    /// Unique among all stored mappings
    pub short_code: String,

    /// When the mapping was stored
    pub created_at: DateTime<Utc>,
}

/// Request payload for `POST /api/urls`
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "custom_code": "my-link"
/// }
/// ```
#[derive(Deserialize)]
pub struct CreateRequest {
    /// The long URL to shorten, stored exactly as sent
    pub url: String,

    /// Optional custom short code. Empty strings count as absent.
    pub custom_code: Option<String>,
}

/// Response returned after successfully creating a short URL
///
/// # Example
/// ```json
/// {
///   "short_code": "abc123",
///   "short_url": "http://localhost:8080/abc123",
///   "long_url": "https://example.com/very/long/url"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateResponse {
    /// The assigned short code, custom or generated
    pub short_code: String,

    /// Base URL followed by the short code, e.g. "http://localhost:8080/abc123"
    pub short_url: String,

    /// The long URL as stored, identical to the one in the request
    pub long_url: String,
}

/// Response for `GET /api/urls/{code}`
#[derive(Serialize, Deserialize, Debug)]
pub struct ResolveResponse {
    /// The short code that was looked up
    pub short_code: String,

    /// Where the short code redirects to
    pub long_url: String,
}

/// One entry of a listing, as shown to clients
///
/// # Example
/// ```json
/// {
///   "short_code": "abc123",
///   "short_url": "http://localhost:8080/abc123",
///   "long_url": "https://example.com",
///   "created_at": "2026-01-17T13:40:00Z"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListEntry {
    /// The stored short code
    pub short_code: String,

    /// Base URL followed by the short code
    pub short_url: String,

    /// Redirect target
    pub long_url: String,

    /// When the mapping was stored
    pub created_at: DateTime<Utc>,
}

impl ListEntry {
    pub fn from_mapping(mapping: UrlMapping, base_url: &str) -> Self {
        Self {
            short_url: format!("{}/{}", base_url, mapping.short_code),
            short_code: mapping.short_code,
            long_url: mapping.long_url,
            created_at: mapping.created_at,
        }
    }
}

/// Query parameters for listing URLs with pagination
///
/// Query string: `?page=2&limit=20`
#[derive(Deserialize, Default)]
pub struct ListParams {
    /// Page number, starts from 1 (default 1)
    pub page: Option<usize>,

    /// Items per page (default 10, maximum 100)
    pub limit: Option<usize>,
}

/// Form body of `POST /shorten`
#[derive(Deserialize)]
pub struct ShortenForm {
    /// The long URL field; blank input is rejected by the store
    pub long_url: String,

    /// Optional custom code field; an empty field counts as absent
    #[serde(default)]
    pub custom_code: Option<String>,
}

/// Form body of `POST /delete`
#[derive(Deserialize)]
pub struct DeleteForm {
    /// Code to delete; unknown codes are ignored
    pub short_code: String,
}
