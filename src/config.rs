//! Runtime configuration read from the environment
//!
//! # Environment Variables
//!
//! - `PORT` - Server port number (default: 8080)
//! - `DATABASE_URL` - Path to the database file (default: "urls.db")
//! - `BASE_URL` - Scheme and host prepended to short codes for display,
//!   e.g. "https://sho.rt". When unset it is taken from each request's `Host`
//!   header.
//! - `AUTHORIZATION` - If set and non-empty, required as the `Authorization`
//!   header on every `/api` request

use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "urls.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub base_url: Option<String>,
    pub api_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE.to_string(),
            base_url: None,
            api_secret: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(port = %raw, "invalid PORT, falling back to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        Self {
            port,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            base_url: non_empty_var("BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            api_secret: non_empty_var("AUTHORIZATION"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}
