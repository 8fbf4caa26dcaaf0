//! Navigation guard resolving what a route request should do given the
//! current session state.
//!
//! The guard is synchronous and side-effect free. While the startup restore
//! is still pending it answers [`RouteDecision::Pending`] for every route,
//! so a shell never flashes the login screen at a user whose session is
//! about to come back.

use std::sync::Arc;

use crate::session::{SessionStatus, SessionStore};

/// Route of the login screen, also the target of redirects.
pub const LOGIN_ROUTE: &str = "/login";
/// Route of the registration screen.
pub const REGISTER_ROUTE: &str = "/register";
/// Route of the home screen.
pub const HOME_ROUTE: &str = "/";

/// What the shell should do with a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested route
    Proceed,
    /// Session still restoring; show a neutral loading state
    Pending,
    /// Send the visitor to the login screen, remembering where they wanted
    /// to go so a successful login can return them there
    RedirectToLogin { from: String },
    /// Signed-in principals have no business on entry screens
    RedirectHome,
}

/// Decides navigation outcomes from session state.
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Resolve a navigation request to `destination`.
    pub fn check(&self, destination: &str) -> RouteDecision {
        match self.session.status() {
            SessionStatus::Restoring => RouteDecision::Pending,
            SessionStatus::Anonymous => {
                if is_entry_route(destination) {
                    RouteDecision::Proceed
                } else {
                    RouteDecision::RedirectToLogin {
                        from: destination.to_string(),
                    }
                }
            }
            SessionStatus::Authenticated(_) => {
                if is_entry_route(destination) {
                    RouteDecision::RedirectHome
                } else {
                    RouteDecision::Proceed
                }
            }
        }
    }
}

/// Entry routes are reachable without a session. A trailing slash does not
/// change the route.
fn is_entry_route(destination: &str) -> bool {
    let destination = if destination.len() > 1 {
        destination.trim_end_matches('/')
    } else {
        destination
    };
    destination == LOGIN_ROUTE || destination == REGISTER_ROUTE
}
