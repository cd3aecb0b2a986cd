pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gemini;
pub mod handlers;
pub mod models;
pub mod prompt;
pub mod proxy;
pub mod routes;
pub mod transcript;

// Re-export key functions for convenience
pub use app::{create_app, init_tracing};
