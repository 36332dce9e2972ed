//! Terminal implementations of the cart client's notifier and navigator.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};

use mart_cart_client::{CartSnapshot, Navigator, Notifier};
use url::Url;

/// Prints shopper messages to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    #[allow(clippy::print_stdout)]
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

/// Turns navigation requests into terminal output.
///
/// A redirect prints the absolute URL to visit. A refresh is only recorded;
/// the command re-fetches the cart once the operation returns.
#[derive(Debug)]
pub struct TerminalNavigator {
    base_url: Url,
    refresh_requested: AtomicBool,
}

impl TerminalNavigator {
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            refresh_requested: AtomicBool::new(false),
        }
    }

    /// Whether a refresh was requested since the last call; clears the flag.
    pub fn take_refresh(&self) -> bool {
        self.refresh_requested.swap(false, Ordering::AcqRel)
    }

    fn resolve(&self, path: &str) -> String {
        self.base_url
            .join(path)
            .map_or_else(|_| path.to_string(), String::from)
    }
}

impl Navigator for TerminalNavigator {
    #[allow(clippy::print_stdout)]
    fn redirect(&self, path: &str) {
        println!("Sign in at {}", self.resolve(path));
    }

    fn refresh(&self) {
        self.refresh_requested.store(true, Ordering::Release);
    }
}

/// Render a cart as plain text, one product per line.
#[must_use]
pub fn render_cart(cart: &CartSnapshot) -> String {
    if cart.product_responses.is_empty() {
        return format!("Cart #{} is empty\n", cart.cart_id);
    }

    let mut out = format!("Cart #{}\n", cart.cart_id);
    for line in &cart.product_responses {
        let name = line.name.as_deref().unwrap_or("(unnamed)");
        let _ = writeln!(out, "  [{}] {name} x{}", line.id, line.count);
    }
    let _ = writeln!(out, "  {} item(s)", cart.total_units());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mart_cart_client::CartLine;
    use mart_core::{CartId, ProductId};

    use super::*;

    #[test]
    fn test_take_refresh_clears_flag() {
        let navigator = TerminalNavigator::new(Url::parse("http://localhost:8080/").unwrap());
        assert!(!navigator.take_refresh());

        navigator.refresh();
        assert!(navigator.take_refresh());
        assert!(!navigator.take_refresh());
    }

    #[test]
    fn test_redirect_resolves_against_base() {
        let navigator = TerminalNavigator::new(Url::parse("http://localhost:8080/shop/").unwrap());
        assert_eq!(navigator.resolve("/login"), "http://localhost:8080/login");
        assert_eq!(navigator.resolve("sign-in"), "http://localhost:8080/shop/sign-in");
    }

    #[test]
    fn test_render_empty_cart() {
        let cart = CartSnapshot {
            cart_id: CartId::new(4),
            product_responses: Vec::new(),
        };
        assert_eq!(render_cart(&cart), "Cart #4 is empty\n");
    }

    #[test]
    fn test_render_cart_lines() {
        let cart = CartSnapshot {
            cart_id: CartId::new(4),
            product_responses: vec![
                CartLine {
                    id: ProductId::new(1),
                    count: 2,
                    image_url: None,
                    name: Some("Chicken".to_string()),
                },
                CartLine {
                    id: ProductId::new(3),
                    count: 1,
                    image_url: Some("/img/3.png".to_string()),
                    name: None,
                },
            ],
        };

        let rendered = render_cart(&cart);
        assert!(rendered.starts_with("Cart #4\n"));
        assert!(rendered.contains("  [1] Chicken x2\n"));
        assert!(rendered.contains("  [3] (unnamed) x1\n"));
        assert!(rendered.ends_with("  3 item(s)\n"));
    }
}
