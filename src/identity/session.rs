use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{AuthError, AuthResult};
use crate::storage::StateStore;
use crate::tprintln;

use super::provider::CredentialStore;
use super::user::User;

/// Key of the one durable slot the session layer owns.
pub const SESSION_KEY: &str = "user";

/// Process-wide session state. `Unrestored` exists only until the first
/// restore attempt completes; after that exactly one of the other two holds.
/// There is no partially-authenticated state to represent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unrestored,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    /// True only before the first restore attempt has completed.
    pub fn is_loading(&self) -> bool { matches!(self, SessionState::Unrestored) }

    pub fn is_authenticated(&self) -> bool { matches!(self, SessionState::Authenticated(_)) }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(u) => Some(u),
            _ => None,
        }
    }
}

/// Owner of the single session per running process.
///
/// Login verification is delegated to the injected `CredentialStore`; the
/// durable slot write and the in-memory transition always happen together
/// under the state lock, and in-flight logins are serialized by an async
/// gate — a second login queues behind the first rather than interleaving.
pub struct SessionManager {
    directory: Arc<dyn CredentialStore>,
    slot: StateStore,
    state: Mutex<SessionState>,
    login_gate: tokio::sync::Mutex<()>,
}

impl SessionManager {
    pub fn new(directory: Arc<dyn CredentialStore>, slot: StateStore) -> Self {
        Self {
            directory,
            slot,
            state: Mutex::new(SessionState::Unrestored),
            login_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Resolve `Unrestored` from the durable slot. Absent slot → anonymous;
    /// valid identity → authenticated; anything unparseable clears the slot
    /// and degrades to anonymous. Never fails outward, and later calls just
    /// return the current state.
    pub fn restore(&self) -> SessionState {
        let mut st = self.state.lock();
        if !st.is_loading() {
            return st.clone();
        }
        *st = match self.slot.get(SESSION_KEY) {
            None => SessionState::Anonymous,
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    tprintln!("session.restore user={} role={}", user.employee_number, user.role);
                    SessionState::Authenticated(user)
                }
                Err(e) => {
                    // Self-heal: corrupt slot content is cleared, not surfaced
                    let err = AuthError::malformed_state(e.to_string());
                    tprintln!("session.restore cleared slot: {}", err);
                    self.slot.delete(SESSION_KEY);
                    SessionState::Anonymous
                }
            },
        };
        st.clone()
    }

    /// Verify credentials and, on success, persist the identity and become
    /// `Authenticated` in one step. On failure the session is unchanged and
    /// the caller must surface only `AuthError::user_message`, which does not
    /// distinguish unknown user from wrong PIN.
    pub async fn login(&self, employee_number: &str, pin: &str) -> AuthResult<User> {
        let _gate = self.login_gate.lock().await;
        let user = self.directory.verify(employee_number, pin)?;
        let payload = serde_json::to_string(&user)
            .map_err(|e| AuthError::internal(e.to_string()))?;
        {
            let mut st = self.state.lock();
            self.slot.set(SESSION_KEY, payload);
            *st = SessionState::Authenticated(user.clone());
        }
        tprintln!("auth.login user={} role={}", user.employee_number, user.role);
        Ok(user)
    }

    /// Clear the durable slot and become `Anonymous`. Valid from any state,
    /// always succeeds.
    pub fn logout(&self) {
        let mut st = self.state.lock();
        self.slot.delete(SESSION_KEY);
        *st = SessionState::Anonymous;
        tprintln!("auth.logout");
    }

    pub fn state(&self) -> SessionState { self.state.lock().clone() }

    pub fn current_user(&self) -> Option<User> { self.state.lock().user().cloned() }

    pub fn is_authenticated(&self) -> bool { self.state.lock().is_authenticated() }

    pub fn is_loading(&self) -> bool { self.state.lock().is_loading() }
}
