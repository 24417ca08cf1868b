use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::database::AppState;

/// Guards the JSON API with a shared secret
///
/// When `Config::api_secret` is set, requests must carry it verbatim in the
/// `Authorization` header. Without a configured secret the check is skipped.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    if let Some(secret) = &state.config.api_secret {
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        if provided != Some(secret.as_str()) {
            tracing::debug!(path = %request.uri().path(), "rejected unauthorized API request");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Invalid or missing authorization header",
                    "code": "unauthorized"
                })),
            )
                .into_response());
        }
    }

    Ok(next.run(request).await)
}
