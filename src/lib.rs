//! A small URL shortener
//!
//! [`store::CodeStore`] owns the short code -> long URL mapping; everything
//! else is HTTP glue around it.

pub mod codegen;
pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod pages;
pub mod route;
pub mod store;
