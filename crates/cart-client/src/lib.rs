//! Mart Cart Client - Authenticated adapter for the cart API.
//!
//! Issues add, update and remove requests against the shop's `/carts`
//! collection on behalf of a signed-in shopper, using the bearer token held
//! in session-scoped storage.
//!
//! # Ports
//!
//! The embedding environment supplies three capabilities:
//! - [`SessionStorage`] - where the access token lives
//! - [`Notifier`] - how messages reach the shopper
//! - [`Navigator`] - how to send the shopper to the login view, and how to
//!   refresh their view after a mutation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mart_cart_client::{
//!     CartClient, CartClientConfig, MemorySessionStorage, Navigator, Notifier,
//! };
//! use mart_core::ProductId;
//!
//! struct Alert;
//! impl Notifier for Alert {
//!     fn notify(&self, message: &str) {
//!         tracing::info!("{message}");
//!     }
//! }
//!
//! struct Page;
//! impl Navigator for Page {
//!     fn redirect(&self, path: &str) {
//!         tracing::info!(path, "redirect");
//!     }
//!     fn refresh(&self) {}
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CartClientConfig::from_env()?;
//! let session = MemorySessionStorage::with_access_token("eyJhbGciOi...");
//! let client = CartClient::new(&config, session, Alert, Arc::new(Page))?;
//!
//! client.add_item(ProductId::new(1)).await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod config;
mod error;
mod ports;
mod session;
mod types;

pub use client::{CartClient, ITEM_ADDED_MESSAGE, MISSING_CREDENTIAL_MESSAGE};
pub use config::{CartClientConfig, ConfigError, StatusPolicy};
pub use error::CartError;
pub use ports::{ACCESS_TOKEN_KEY, Navigator, Notifier, SessionStorage};
pub use session::{FileSessionStorage, MemorySessionStorage, SessionError};
pub use types::{
    AccessToken, AddCartItemRequest, CartLine, CartSnapshot, Settled, UpdateCartItemRequest,
};
