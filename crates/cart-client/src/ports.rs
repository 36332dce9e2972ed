//! Capabilities the embedding environment provides to the cart client.

use std::sync::Arc;

use crate::types::AccessToken;

/// Session storage key holding the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Read-only view of session-scoped key/value storage.
pub trait SessionStorage: Send + Sync {
    /// Look up a value by key.
    fn get(&self, key: &str) -> Option<String>;

    /// The signed-in shopper's access token.
    ///
    /// An empty value counts as absent.
    fn access_token(&self) -> Option<AccessToken> {
        self.get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(AccessToken::new)
    }
}

/// Shows a message to the shopper.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Moves the shopper between views.
pub trait Navigator: Send + Sync {
    /// Leave the current view for `path` (e.g. the login page).
    fn redirect(&self, path: &str);

    /// Re-synchronise the current view with server state.
    fn refresh(&self);
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message);
    }
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn redirect(&self, path: &str) {
        (**self).redirect(path);
    }

    fn refresh(&self) {
        (**self).refresh();
    }
}
