//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Put product 3 in the cart
//! mart-cart add 3
//!
//! # Set product 3 to two units, then print the cart
//! mart-cart update 3 2
//!
//! # Take product 3 out of the cart, then print the cart
//! mart-cart remove 3
//!
//! # Print the cart
//! mart-cart show
//! ```
//!
//! # Environment Variables
//!
//! - `MART_API_BASE_URL` - Base URL of the shop
//! - `MART_SESSION_FILE` - Session file holding `{"accessToken": "..."}`

use std::path::Path;
use std::sync::Arc;

use mart_cart_client::{
    CartClient, CartClientConfig, CartError, ConfigError, FileSessionStorage,
};
use mart_core::{ProductId, Quantity};
use thiserror::Error;

use crate::terminal::{TerminalNavigator, TerminalNotifier, render_cart};

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart operation did not complete.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// A cart client wired to the terminal.
pub struct CartSession {
    client: CartClient,
    navigator: Arc<TerminalNavigator>,
}

impl CartSession {
    /// Load configuration and open the session file.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if the environment is incomplete.
    pub fn open(session_file: &Path) -> Result<Self, CommandError> {
        let config = CartClientConfig::from_env()?;
        let navigator = Arc::new(TerminalNavigator::new(config.base_url.clone()));

        tracing::debug!(
            base_url = %config.base_url,
            session_file = %session_file.display(),
            "Opening cart session"
        );

        let client = CartClient::new(
            &config,
            FileSessionStorage::new(session_file),
            TerminalNotifier,
            Arc::clone(&navigator),
        )?;

        Ok(Self { client, navigator })
    }

    /// Add a product to the cart.
    pub async fn add(&self, product_id: ProductId) -> Result<(), CommandError> {
        self.client.add_item(product_id).await?;
        self.refresh_if_requested().await
    }

    /// Change the quantity of a product.
    pub async fn update(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<(), CommandError> {
        self.client
            .update_item_quantity(product_id, quantity)
            .await?;
        self.refresh_if_requested().await
    }

    /// Remove a product from the cart.
    pub async fn remove(&self, product_id: ProductId) -> Result<(), CommandError> {
        self.client.remove_item(product_id).await?;
        self.refresh_if_requested().await
    }

    /// Print the cart.
    pub async fn show(&self) -> Result<(), CommandError> {
        self.print_cart().await
    }

    async fn refresh_if_requested(&self) -> Result<(), CommandError> {
        if self.navigator.take_refresh() {
            self.print_cart().await?;
        }
        Ok(())
    }

    #[allow(clippy::print_stdout)]
    async fn print_cart(&self) -> Result<(), CommandError> {
        let cart = self.client.fetch_cart().await?;
        print!("{}", render_cart(&cart));
        Ok(())
    }
}
