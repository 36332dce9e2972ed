//! Cart API wire types.

use mart_core::{CartId, ProductId, Quantity};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Bearer token issued at login and kept in session storage.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Borrow the raw token for an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Body of `POST /carts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    /// Product to put in the cart.
    pub product_id: ProductId,
}

/// Body of `PATCH /carts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    /// Product whose line changes.
    pub product_id: ProductId,
    /// New number of units.
    pub count: Quantity,
}

/// Cart contents returned by `GET /carts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Server-side cart identifier.
    pub cart_id: CartId,
    /// One entry per product in the cart.
    #[serde(default)]
    pub product_responses: Vec<CartLine>,
}

impl CartSnapshot {
    /// Total number of units across all lines.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.product_responses
            .iter()
            .map(|line| u64::from(line.count))
            .sum()
    }

    /// Find the line for a product, if it is in the cart.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.product_responses
            .iter()
            .find(|line| line.id == product_id)
    }
}

/// A single product line in a [`CartSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: ProductId,
    pub count: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Completion signal for a cart mutation that reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    /// Status the server answered with.
    pub status: StatusCode,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret-jwt");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-jwt"));
        assert_eq!(token.expose(), "super-secret-jwt");
    }

    #[test]
    fn test_add_request_wire_format() {
        let body = AddCartItemRequest {
            product_id: ProductId::new(3),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"productId": 3})
        );
    }

    #[test]
    fn test_update_request_wire_format() {
        let body = UpdateCartItemRequest {
            product_id: ProductId::new(3),
            count: Quantity::new(4).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"productId": 3, "count": 4})
        );
    }

    #[test]
    fn test_snapshot_decodes_server_shape() {
        let json = serde_json::json!({
            "cartId": 11,
            "productResponses": [
                {"id": 1, "count": 2, "imageUrl": "/img/1.png", "name": "Chicken"},
                {"id": 5, "count": 1, "imageUrl": null, "name": "Pizza"}
            ]
        });
        let snapshot: CartSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.cart_id, CartId::new(11));
        assert_eq!(snapshot.total_units(), 3);
        assert_eq!(
            snapshot.line(ProductId::new(5)).unwrap().name.as_deref(),
            Some("Pizza")
        );
        assert!(snapshot.line(ProductId::new(9)).is_none());
    }

    #[test]
    fn test_snapshot_accepts_null_name() {
        let snapshot: CartSnapshot = serde_json::from_str(
            r#"{"cartId":1,"productResponses":[{"id":1,"count":2,"imageUrl":null,"name":null}]}"#,
        )
        .unwrap();
        let line = snapshot.line(ProductId::new(1)).unwrap();
        assert!(line.name.is_none());
        assert!(line.image_url.is_none());
        assert_eq!(line.count, 2);
    }

    #[test]
    fn test_snapshot_without_lines() {
        let snapshot: CartSnapshot = serde_json::from_str(r#"{"cartId": 1}"#).unwrap();
        assert!(snapshot.product_responses.is_empty());
        assert_eq!(snapshot.total_units(), 0);
    }
}
