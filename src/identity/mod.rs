//! Central identity and session management for Report Central.
//! Keep the public surface thin and split implementation across sub-modules.

mod user;
mod provider;
mod session;
mod guard;

pub use user::{Role, User};
pub use provider::{CredentialStore, LocalDirectory, StaticDirectory};
pub use session::{SessionManager, SessionState, SESSION_KEY};
pub use guard::{route_decision, RouteDecision, DEFAULT_LANDING, LOGIN_PATH};
