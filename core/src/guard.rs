//! Navigation guard for authenticated screens.

use crate::auth::AuthContext;

/// Route reachable without a token.
pub const LOGIN_ROUTE: &str = "login";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

/// Decide whether navigation to the route named `route` may proceed.
///
/// Every route except the login route requires a token.
pub fn check(route: &str, auth: &AuthContext) -> Navigation {
    if route == LOGIN_ROUTE || auth.is_authenticated() {
        Navigation::Proceed
    } else {
        tracing::debug!(route, "no token, redirecting to login");
        Navigation::Redirect(LOGIN_PATH.to_string())
    }
}
