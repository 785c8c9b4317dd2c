//! Unified error model for the authentication boundary.
//! `NotFound` and `InvalidCredentials` are distinct kinds internally but share
//! one user-visible message, so a failed login never reveals whether the
//! employee number or the PIN was the wrong half.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Message surfaced for any credential failure, regardless of which check tripped.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid employee number or PIN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthError {
    /// No identity registered under the supplied employee number.
    NotFound { message: String },
    /// Identity exists but the PIN did not verify.
    InvalidCredentials { message: String },
    /// Persisted session slot held something that does not parse to an identity.
    MalformedState { message: String },
    /// I/O or serialization trouble in the user registry.
    Registry { message: String },
    Internal { message: String },
}

impl AuthError {
    pub fn message(&self) -> &str {
        match self {
            AuthError::NotFound { message }
            | AuthError::InvalidCredentials { message }
            | AuthError::MalformedState { message }
            | AuthError::Registry { message }
            | AuthError::Internal { message } => message.as_str(),
        }
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self { AuthError::NotFound { message: msg.into() } }
    pub fn invalid_credentials<S: Into<String>>(msg: S) -> Self { AuthError::InvalidCredentials { message: msg.into() } }
    pub fn malformed_state<S: Into<String>>(msg: S) -> Self { AuthError::MalformedState { message: msg.into() } }
    pub fn registry<S: Into<String>>(msg: S) -> Self { AuthError::Registry { message: msg.into() } }
    pub fn internal<S: Into<String>>(msg: S) -> Self { AuthError::Internal { message: msg.into() } }

    /// True for the two kinds a human can fix by retyping their credentials.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, AuthError::NotFound { .. } | AuthError::InvalidCredentials { .. })
    }

    /// Message safe to show to the person at the login form. Credential
    /// failures collapse to one string; everything else is a generic failure.
    pub fn user_message(&self) -> &'static str {
        if self.is_credential_failure() {
            INVALID_CREDENTIALS_MESSAGE
        } else {
            "Login failed, please try again"
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            AuthError::NotFound { .. } => "not_found",
            AuthError::InvalidCredentials { .. } => "invalid_credentials",
            AuthError::MalformedState { .. } => "malformed_state",
            AuthError::Registry { .. } => "registry",
            AuthError::Internal { .. } => "internal",
        };
        write!(f, "{}: {}", kind, self.message())
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: registry plumbing unless constructed explicitly
        AuthError::Registry { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_user_message() {
        let nf = AuthError::not_found("no user 9999");
        let bad = AuthError::invalid_credentials("pin mismatch for 1001");
        assert!(nf.is_credential_failure());
        assert!(bad.is_credential_failure());
        assert_eq!(nf.user_message(), bad.user_message());
        assert_eq!(nf.user_message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn internal_kinds_do_not_leak_detail_to_users() {
        let reg = AuthError::registry("users.json: permission denied");
        assert!(!reg.is_credential_failure());
        assert_ne!(reg.user_message(), INVALID_CREDENTIALS_MESSAGE);
        assert!(!reg.user_message().contains("users.json"));
    }

    #[test]
    fn display_includes_kind_and_message() {
        let e = AuthError::malformed_state("bad json");
        assert_eq!(e.to_string(), "malformed_state: bad json");
    }
}
