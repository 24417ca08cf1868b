//! Server-rendered HTML pages
//!
//! The home page lists every mapping and offers the shorten and delete
//! forms. Templates live in `templates/`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};

use crate::database::AppState;
use crate::error::{ApiError, StoreError};
use crate::handler::{base_url, check_redirect_target, custom_code, with_store};
use crate::model::{DeleteForm, ListEntry, ShortenForm};

/// Home page: shorten form plus all existing mappings, newest first
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Every stored mapping, already ordered newest first
    pub entries: Vec<ListEntry>,
}

/// Shown after a successful `POST /shorten`
#[derive(Template, WebTemplate)]
#[template(path = "created.html")]
pub struct CreatedTemplate {
    /// Base URL followed by the new short code
    pub short_url: String,

    /// The long URL exactly as it was stored
    pub long_url: String,
}

/// Single-message page used for errors and missing codes
#[derive(Template, WebTemplate)]
#[template(path = "message.html")]
pub struct MessageTemplate {
    pub title: String,
    pub message: String,
}

impl MessageTemplate {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new("URL not found", "This short link does not exist or was deleted.")
    }
}

fn error_page(err: ApiError) -> Response {
    let (status, _) = err.status();
    if status.is_server_error() {
        tracing::error!(error = %err, "page request failed");
    }

    let message = match &err {
        ApiError::Store(StoreError::EmptyInput) | ApiError::InvalidUrl(_) => {
            "Please enter a valid URL".to_string()
        }
        _ => err.public_message(),
    };
    (status, MessageTemplate::new("Error", message)).into_response()
}

/// `GET /`
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mappings = match with_store(&state, |store| store.list()).await {
        Ok(mappings) => mappings,
        Err(err) => return error_page(err),
    };
    let base = base_url(&state.config, &headers);

    HomeTemplate {
        entries: mappings
            .into_iter()
            .map(|mapping| ListEntry::from_mapping(mapping, &base))
            .collect(),
    }
    .into_response()
}

/// `POST /shorten` from the home page form
pub async fn shorten_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ShortenForm>,
) -> Response {
    let custom = match custom_code(form.custom_code) {
        Ok(custom) => custom,
        Err(err) => return error_page(err),
    };
    if let Err(err) = check_redirect_target(&form.long_url) {
        return error_page(err);
    }

    let long_url = form.long_url.clone();
    let result = with_store(&state, move |store| store.shorten(&long_url, custom.as_deref())).await;

    match result {
        Ok(short_code) => CreatedTemplate {
            short_url: format!("{}/{}", base_url(&state.config, &headers), short_code),
            long_url: form.long_url,
        }
        .into_response(),
        Err(err) => error_page(err),
    }
}

/// `POST /delete` from the home page list; always returns to `/`
pub async fn delete_form(State(state): State<AppState>, Form(form): Form<DeleteForm>) -> Response {
    match with_store(&state, move |store| store.delete(&form.short_code)).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => error_page(err),
    }
}
