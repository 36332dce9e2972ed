//! Cart API client.
//!
//! Provides the shopper-facing cart operations: add an item, change its
//! quantity, remove it, and read the cart back.

use std::sync::Arc;

use mart_core::{ProductId, Quantity};
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::{CartClientConfig, StatusPolicy};
use crate::error::CartError;
use crate::ports::{Navigator, Notifier, SessionStorage};
use crate::types::{
    AccessToken, AddCartItemRequest, CartSnapshot, Settled, UpdateCartItemRequest,
};

/// Cart collection path, relative to the configured base URL.
const CARTS_PATH: &str = "carts";

/// Query parameter naming the product on `DELETE /carts`.
const PRODUCT_ID_PARAM: &str = "product-id";

/// Shown when an operation is attempted without a session token.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "No user credential present. Please sign in.";

/// Shown after an item has been added.
pub const ITEM_ADDED_MESSAGE: &str = "Item added to cart.";

/// Cart API client bound to a shopper's session.
///
/// Every operation first reads the access token from [`SessionStorage`]. With
/// no token it notifies the shopper, redirects to the login view and returns
/// [`CartError::MissingCredential`] without touching the network.
///
/// Cheap to clone; clones share the HTTP connection pool and ports.
#[derive(Clone)]
pub struct CartClient {
    inner: Arc<CartClientInner>,
}

struct CartClientInner {
    client: reqwest::Client,
    carts_url: Url,
    login_path: String,
    status_policy: StatusPolicy,
    session: Box<dyn SessionStorage>,
    notifier: Box<dyn Notifier>,
    navigator: Box<dyn Navigator>,
}

impl std::fmt::Debug for CartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartClient")
            .field("carts_url", &self.inner.carts_url.as_str())
            .field("login_path", &self.inner.login_path)
            .field("status_policy", &self.inner.status_policy)
            .finish_non_exhaustive()
    }
}

impl CartClient {
    /// Create a new cart client.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidUrl` if the cart endpoint cannot be built
    /// from the base URL, or `CartError::Transport` if the HTTP client fails
    /// to build.
    pub fn new(
        config: &CartClientConfig,
        session: impl SessionStorage + 'static,
        notifier: impl Notifier + 'static,
        navigator: impl Navigator + 'static,
    ) -> Result<Self, CartError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            inner: Arc::new(CartClientInner {
                client,
                carts_url: config.base_url.join(CARTS_PATH)?,
                login_path: config.login_path.clone(),
                status_policy: config.status_policy,
                session: Box::new(session),
                notifier: Box::new(notifier),
                navigator: Box::new(navigator),
            }),
        })
    }

    /// Absolute URL of the cart collection.
    #[must_use]
    pub fn carts_url(&self) -> &Url {
        &self.inner.carts_url
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Add one unit of a product to the cart.
    ///
    /// Sends `POST /carts` with `{"productId": id}`. Once the server answers,
    /// the shopper is told the item was added.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingCredential` if there is no session token.
    /// Returns `CartError::Transport` if the request fails.
    /// Returns `CartError::Status` for non-2xx replies under
    /// [`StatusPolicy::RequireSuccess`].
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(&self, product_id: ProductId) -> Result<Settled, CartError> {
        let token = self.require_token()?;

        let request = self
            .inner
            .client
            .post(self.inner.carts_url.clone())
            .bearer_auth(token.expose())
            .json(&AddCartItemRequest { product_id });

        let response = self.dispatch("add_item", request).await?;

        self.inner.notifier.notify(ITEM_ADDED_MESSAGE);
        debug!(status = %response.status(), "Cart item added");

        Ok(Settled {
            status: response.status(),
        })
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// Sends `PATCH /carts` with `{"productId": id, "count": quantity}` and
    /// asks the navigator to refresh once the server answers.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingCredential` if there is no session token.
    /// Returns `CartError::Transport` if the request fails.
    /// Returns `CartError::Status` for non-2xx replies under
    /// [`StatusPolicy::RequireSuccess`].
    #[instrument(skip(self), fields(product_id = %product_id, quantity = %quantity))]
    pub async fn update_item_quantity(
        &self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Settled, CartError> {
        let token = self.require_token()?;

        let request = self
            .inner
            .client
            .patch(self.inner.carts_url.clone())
            .bearer_auth(token.expose())
            .json(&UpdateCartItemRequest {
                product_id,
                count: quantity,
            });

        let response = self.dispatch("update_item_quantity", request).await?;

        self.inner.navigator.refresh();
        debug!(status = %response.status(), "Cart item quantity updated");

        Ok(Settled {
            status: response.status(),
        })
    }

    /// Remove a product from the cart.
    ///
    /// Sends `DELETE /carts?product-id=<id>` with no body and asks the
    /// navigator to refresh once the server answers. Repeated calls send
    /// repeated requests.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingCredential` if there is no session token.
    /// Returns `CartError::Transport` if the request fails.
    /// Returns `CartError::Status` for non-2xx replies under
    /// [`StatusPolicy::RequireSuccess`].
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<Settled, CartError> {
        let token = self.require_token()?;

        let mut url = self.inner.carts_url.clone();
        url.query_pairs_mut()
            .append_pair(PRODUCT_ID_PARAM, &product_id.to_string());

        let request = self
            .inner
            .client
            .delete(url)
            .bearer_auth(token.expose())
            .header(CONTENT_TYPE, "application/json");

        let response = self.dispatch("remove_item", request).await?;

        self.inner.navigator.refresh();
        debug!(status = %response.status(), "Cart item removed");

        Ok(Settled {
            status: response.status(),
        })
    }

    /// Read the shopper's cart.
    ///
    /// Sends `GET /carts`. Embeddings call this from their refresh handler to
    /// pick up server state after a mutation. Unlike the mutations, a non-2xx
    /// reply is always an error since there is no cart to decode.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingCredential` if there is no session token.
    /// Returns `CartError::Transport` if the request fails.
    /// Returns `CartError::Status` for non-2xx replies.
    /// Returns `CartError::Decode` if the body is not a cart.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<CartSnapshot, CartError> {
        let token = self.require_token()?;

        let request = self
            .inner
            .client
            .get(self.inner.carts_url.clone())
            .bearer_auth(token.expose());

        let response = self.dispatch("fetch_cart", request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Cart API rejected cart fetch");
            return Err(CartError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let snapshot: CartSnapshot = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to decode cart");
            CartError::Decode(e.to_string())
        })?;

        debug!(
            cart_id = %snapshot.cart_id,
            lines = snapshot.product_responses.len(),
            "Cart fetched"
        );

        Ok(snapshot)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Read the access token, or send the shopper to the login view.
    fn require_token(&self) -> Result<AccessToken, CartError> {
        if let Some(token) = self.inner.session.access_token() {
            return Ok(token);
        }

        warn!(
            login_path = %self.inner.login_path,
            "No access token in session storage, redirecting to login"
        );
        self.inner.notifier.notify(MISSING_CREDENTIAL_MESSAGE);
        self.inner.navigator.redirect(&self.inner.login_path);

        Err(CartError::MissingCredential)
    }

    /// Send a request and apply the status policy.
    ///
    /// Transport failures are logged here and carry no user-facing side
    /// effect.
    async fn dispatch(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, CartError> {
        let response = request.send().await.map_err(|e| {
            error!(operation, error = %e, "Cart request failed");
            CartError::Transport(e)
        })?;

        let status = response.status();
        if self.inner.status_policy == StatusPolicy::RequireSuccess && !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(operation, status = %status, "Cart API returned an error status");
            return Err(CartError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}
