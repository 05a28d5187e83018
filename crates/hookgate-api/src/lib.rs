// hookgate-api: Async Rust client for the webhook gateway admin API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
mod services;
pub mod transport;

pub use auth::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use client::ApiClient;
pub use error::{Error, ErrorShape};
pub use models::*;
pub use transport::ClientConfig;
