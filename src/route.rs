//! Route definitions
//!
//! This module maps every HTTP route to its handler and attaches the shared
//! application state.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{create_short_url, delete_short_url, get_url, list_urls, redirect_url};
use crate::middleware::auth_middleware;
use crate::pages::{delete_form, home, shorten_form};

/// Creates the application router
///
/// # Route Definitions
///
/// - `GET /` - HTML home page with the shorten form and all mappings
/// - `POST /shorten` - Shorten form submission
/// - `POST /delete` - Delete form submission, redirects back to `/`
/// - `GET /{code}` - Redirects to the long URL
/// - `GET /api/urls` - Paginated listing, newest first
/// - `POST /api/urls` - Creates a short URL
/// - `GET /api/urls/{code}` - Looks up one mapping
/// - `DELETE /api/urls/{code}` - Deletes a mapping (idempotent)
///
/// ```no_run
/// # use tinylink::config::Config;
/// # use tinylink::database::AppState;
/// # use tinylink::route::create_app;
/// # use tinylink::store::CodeStore;
/// let store = CodeStore::open("urls.db").unwrap();
/// let app = create_app(AppState::new(store, Config::default()));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/urls", get(list_urls).post(create_short_url))
        .route("/urls/{code}", get(get_url).delete(delete_short_url))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(home))
        .route("/shorten", post(shorten_form))
        .route("/delete", post(delete_form))
        .route("/{code}", get(redirect_url))
        .nest("/api", api_routes)
        .with_state(state)
}
