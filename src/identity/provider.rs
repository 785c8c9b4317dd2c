use anyhow::Result;
use std::collections::HashMap;

use crate::error::{AuthError, AuthResult};
use crate::security;

use super::user::User;

/// Verification seam for the session manager. The backing identity set is
/// injectable so tests and demos can supply fixtures without touching disk.
pub trait CredentialStore: Send + Sync {
    fn verify(&self, employee_number: &str, pin: &str) -> AuthResult<User>;
}

/// Disk-backed directory over `users.json` under the data root.
pub struct LocalDirectory {
    pub root: String,
}

impl LocalDirectory {
    pub fn new(root: impl Into<String>) -> Self { Self { root: root.into() } }
}

impl CredentialStore for LocalDirectory {
    fn verify(&self, employee_number: &str, pin: &str) -> AuthResult<User> {
        security::verify(&self.root, employee_number, pin)
    }
}

/// In-memory directory built from provisioned `(user, pin)` pairs. PINs are
/// hashed on insert, same verification rule as the disk-backed directory.
#[derive(Default)]
pub struct StaticDirectory {
    entries: HashMap<String, (User, String)>,
}

impl StaticDirectory {
    pub fn new() -> Self { Self::default() }

    pub fn with_user(mut self, user: User, pin: &str) -> Result<Self> {
        let hash = security::hash_pin(pin)?;
        self.entries.insert(user.employee_number.clone(), (user, hash));
        Ok(self)
    }
}

impl CredentialStore for StaticDirectory {
    fn verify(&self, employee_number: &str, pin: &str) -> AuthResult<User> {
        let Some((user, hash)) = self.entries.get(employee_number) else {
            return Err(AuthError::not_found(format!("no user for employee number {}", employee_number)));
        };
        if !security::verify_pin(hash, pin) {
            return Err(AuthError::invalid_credentials(format!("pin mismatch for {}", employee_number)));
        }
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    fn demo_user() -> User {
        User {
            id: 42,
            employee_number: "2042".into(),
            email: "demo@camma.com".into(),
            role: Role::Employee,
            department: "Accounting".into(),
            name: None,
        }
    }

    #[test]
    fn static_directory_verifies_like_the_disk_directory() {
        let dir = StaticDirectory::new().with_user(demo_user(), "7777").unwrap();
        assert_eq!(dir.verify("2042", "7777").unwrap().id, 42);
        assert!(matches!(dir.verify("2042", "1234").unwrap_err(), AuthError::InvalidCredentials { .. }));
        assert!(matches!(dir.verify("9999", "7777").unwrap_err(), AuthError::NotFound { .. }));
    }
}
