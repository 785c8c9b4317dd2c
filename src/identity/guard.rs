use super::session::SessionState;
use super::user::Role;

/// Where anonymous traffic is sent to sign in.
pub const LOGIN_PATH: &str = "/login";
/// Landing page for authenticated users who hit a route outside their role.
pub const DEFAULT_LANDING: &str = "/dashboard";

/// Outcome of gating one navigation. The navigation collaborator performs the
/// redirect; the guard itself holds no state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session not restored yet: render nothing, decide on the next pass.
    Pending,
    /// Not signed in: go to the login view, remembering where the user was
    /// headed so a successful login can return them there.
    RedirectToLogin { from: String },
    /// Signed in but the route's allow-list excludes this role.
    RedirectToLanding,
    /// Render the protected content.
    Render,
}

/// Gate a navigation: pure function of the session state and the route's role
/// allow-list. An empty allow-list means any authenticated identity may pass.
pub fn route_decision(state: &SessionState, allowed_roles: &[Role], requested_path: &str) -> RouteDecision {
    match state {
        SessionState::Unrestored => RouteDecision::Pending,
        SessionState::Anonymous => RouteDecision::RedirectToLogin { from: requested_path.to_string() },
        SessionState::Authenticated(user) => {
            if allowed_roles.is_empty() || allowed_roles.contains(&user.role) {
                RouteDecision::Render
            } else {
                RouteDecision::RedirectToLanding
            }
        }
    }
}
