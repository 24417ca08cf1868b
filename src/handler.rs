//! HTTP request handlers for the JSON API and the redirect endpoint
//!
//! Handlers hold no decision logic of their own: they translate between HTTP
//! and [`CodeStore`](crate::store::CodeStore) calls.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::Config;
use crate::database::AppState;
use crate::error::{ApiError, StoreError};
use crate::model::{CreateRequest, CreateResponse, ListEntry, ListParams, ResolveResponse};
use crate::pages::MessageTemplate;
use crate::store::CodeStore;

/// Path segments taken by fixed routes; a short code with one of these names
/// would never be reachable.
pub const RESERVED_CODES: [&str; 3] = ["api", "shorten", "delete"];

/// Scheme and host to put in front of short codes.
///
/// `BASE_URL` wins when configured; otherwise the request's `Host` header is
/// used, and as a last resort `http://localhost:{port}`.
pub fn base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(base) = &config.base_url {
        return base.clone();
    }

    match headers.get(header::HOST).and_then(|host| host.to_str().ok()) {
        Some(host) => format!("http://{}", host),
        None => format!("http://localhost:{}", config.port),
    }
}

/// Normalizes an optional custom code from a request: blank means absent.
/// Codes that cannot be served as a single path segment are rejected.
pub fn custom_code(raw: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(code) = raw.filter(|code| !code.is_empty()) else {
        return Ok(None);
    };

    let unroutable = code
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'));
    if unroutable || RESERVED_CODES.contains(&code.as_str()) {
        return Err(ApiError::InvalidCode(code));
    }

    Ok(Some(code))
}

/// Runs a store call on the blocking thread pool.
///
/// redb transactions block the calling thread (a writer waits for the
/// previous one to commit), so they must stay off the async workers.
pub async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&CodeStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    Ok(tokio::task::spawn_blocking(move || f(&store)).await??)
}

/// Rejects long URLs that could not be sent back in a `Location` header,
/// such as ones containing control characters. Blank URLs pass through so
/// the store reports them as empty.
pub fn check_redirect_target(long_url: &str) -> Result<(), ApiError> {
    if long_url.trim().is_empty() || HeaderValue::from_str(long_url).is_ok() {
        Ok(())
    } else {
        Err(ApiError::InvalidUrl(long_url.to_string()))
    }
}

/// Creates a new short URL
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "custom_code": "my-link"
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - URL successfully created
/// - **400 Bad Request** - blank or non-redirectable URL, or unusable custom code
/// - **409 Conflict** - custom code already taken
/// - **503 Service Unavailable** - no free random code could be found
pub async fn create_short_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let custom = custom_code(payload.custom_code)?;
    check_redirect_target(&payload.url)?;

    let long_url = payload.url.clone();
    let short_code =
        with_store(&state, move |store| store.shorten(&long_url, custom.as_deref())).await?;

    let response = CreateResponse {
        short_url: format!("{}/{}", base_url(&state.config, &headers), short_code),
        short_code,
        long_url: payload.url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Redirects a short URL to its original destination
///
/// - **307 Temporary Redirect** - to the stored long URL
/// - **404 Not Found** - HTML "URL not found" page
/// - **500 Internal Server Error** - the stored URL is not a valid
///   `Location` header value
pub async fn redirect_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let lookup = code.clone();
    match with_store(&state, move |store| store.resolve(&lookup)).await? {
        Some(long_url) => {
            let location =
                HeaderValue::from_str(&long_url).map_err(|_| ApiError::UnservableTarget(code))?;
            Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
        }
        None => {
            tracing::debug!(short_code = %code, "redirect target not found");
            Ok((StatusCode::NOT_FOUND, MessageTemplate::not_found()).into_response())
        }
    }
}

/// Returns the mapping for one short code
///
/// `GET /api/urls/{code}`
pub async fn get_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let lookup = code.clone();
    let long_url = with_store(&state, move |store| store.resolve(&lookup))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(ResolveResponse {
        short_code: code,
        long_url,
    }))
}

/// Lists URLs newest first, paginated
///
/// # Query Parameters
///
/// - `page` (optional) - Page number, starts from 1 (default: 1)
/// - `limit` (optional) - Items per page, max 100 (default: 10)
///
/// # Response
///
/// ```json
/// {
///   "page": 1,
///   "limit": 10,
///   "total": 42,
///   "data": [...]
/// }
/// ```
pub async fn list_urls(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1).saturating_mul(limit);

    let mappings = with_store(&state, |store| store.list()).await?;
    let total = mappings.len();
    let base = base_url(&state.config, &headers);

    let data: Vec<ListEntry> = mappings
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|mapping| ListEntry::from_mapping(mapping, &base))
        .collect();

    Ok(Json(json!({
        "page": page,
        "limit": limit,
        "total": total,
        "data": data,
    })))
}

/// Deletes a short URL
///
/// Always answers **204 No Content**: deleting a code that does not exist
/// leaves the store in the same state as deleting one that does.
pub async fn delete_short_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    with_store(&state, move |store| store.delete(&code)).await?;
    Ok(StatusCode::NO_CONTENT)
}
