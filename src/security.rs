//! Credential registry and PIN verification.
//!
//! Users live in a single `users.json` under the data root, each record an
//! identity plus an Argon2 PHC string for the PIN. The original system
//! "hashed" PINs with a reversible base64 encoding; that is a known weakness
//! and is deliberately replaced here with a salted one-way Argon2 hash.

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AuthError, AuthResult};
use crate::identity::{Role, User};

/// One row of the registry: the public identity plus the PIN verifier.
/// The hash never travels with the `User` handed to the session layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub pin_hash: String,
}

fn registry_path(root: &str) -> PathBuf {
    Path::new(root).join("users.json")
}

/// Hash a PIN into an Argon2 PHC string with a fresh random salt.
pub fn hash_pin(pin: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(pin.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

/// Verify a PIN against a stored PHC string. Unparseable hashes verify false.
pub fn verify_pin(hash: &str, pin: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(pin.as_bytes(), &parsed).is_ok()
    } else { false }
}

fn read_registry(path: &Path) -> Result<Vec<UserRecord>> {
    if !path.exists() { return Ok(Vec::new()); }
    let bytes = std::fs::read(path)?;
    let records: Vec<UserRecord> = serde_json::from_slice(&bytes)?;
    Ok(records)
}

fn write_registry(path: &Path, records: &[UserRecord]) -> Result<()> {
    if let Some(dir) = path.parent() { std::fs::create_dir_all(dir).ok(); }
    let bytes = serde_json::to_vec_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(tmp, path)?;
    Ok(())
}

/// Seed the demo identities when no registry exists yet. All three share the
/// demo PIN "1234", matching the accounts the dashboard ships with.
pub fn ensure_default_users(root: &str) -> Result<()> {
    let p = registry_path(root);
    if p.exists() { return Ok(()); }
    let defaults = [
        (1i64, "1001", "admin@camma.com", Role::Admin, "Digital Marketing", "Admin User"),
        (2, "1002", "manager@camma.com", Role::Manager, "Branches Management", "Manager User"),
        (3, "1003", "employee@camma.com", Role::Employee, "Accounting", "Employee User"),
    ];
    let mut records = Vec::with_capacity(defaults.len());
    for (id, number, email, role, department, name) in defaults {
        records.push(UserRecord {
            user: User {
                id,
                employee_number: number.to_string(),
                email: email.to_string(),
                role,
                department: department.to_string(),
                name: Some(name.to_string()),
            },
            pin_hash: hash_pin("1234")?,
        });
    }
    write_registry(&p, &records)
}

/// Add (or replace) a user, hashing the supplied PIN. Any existing record
/// with the same employee number is dropped first.
pub fn add_user(root: &str, user: User, pin: &str) -> Result<()> {
    let p = registry_path(root);
    let mut records = read_registry(&p)?;
    records.retain(|r| r.user.employee_number != user.employee_number);
    records.push(UserRecord { user, pin_hash: hash_pin(pin)? });
    write_registry(&p, &records)
}

pub fn delete_user(root: &str, employee_number: &str) -> Result<()> {
    let p = registry_path(root);
    let mut records = read_registry(&p)?;
    records.retain(|r| r.user.employee_number != employee_number);
    write_registry(&p, &records)
}

/// Update selected fields of an existing user. `None` keeps the current value.
pub fn alter_user(
    root: &str,
    employee_number: &str,
    new_pin: Option<&str>,
    new_role: Option<Role>,
    new_department: Option<&str>,
    new_email: Option<&str>,
    new_name: Option<&str>,
) -> Result<()> {
    let p = registry_path(root);
    let mut records = read_registry(&p)?;
    let Some(rec) = records.iter_mut().find(|r| r.user.employee_number == employee_number) else {
        return Err(anyhow!("user not found"));
    };
    if let Some(pin) = new_pin { rec.pin_hash = hash_pin(pin)?; }
    if let Some(role) = new_role { rec.user.role = role; }
    if let Some(dep) = new_department { rec.user.department = dep.to_string(); }
    if let Some(email) = new_email { rec.user.email = email.to_string(); }
    if let Some(name) = new_name { rec.user.name = Some(name.to_string()); }
    write_registry(&p, &records)
}

/// Public identities in the registry, without PIN hashes.
pub fn list_users(root: &str) -> Result<Vec<User>> {
    let records = read_registry(&registry_path(root))?;
    Ok(records.into_iter().map(|r| r.user).collect())
}

/// Look up an identity by employee number and verify the PIN. Read-only.
///
/// The two failure kinds stay distinct here; callers surfacing messages to
/// humans must go through `AuthError::user_message`, which collapses them.
pub fn verify(root: &str, employee_number: &str, pin: &str) -> AuthResult<User> {
    let records = read_registry(&registry_path(root))
        .map_err(|e| AuthError::registry(e.to_string()))?;
    let Some(rec) = records.iter().find(|r| r.user.employee_number == employee_number) else {
        return Err(AuthError::not_found(format!("no user for employee number {}", employee_number)));
    };
    if !verify_pin(&rec.pin_hash, pin) {
        return Err(AuthError::invalid_credentials(format!("pin mismatch for {}", employee_number)));
    }
    Ok(rec.user.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hash_pin_is_salted_and_one_way() {
        let a = hash_pin("1234").unwrap();
        let b = hash_pin("1234").unwrap();
        // PHC strings embed the salt, so two hashes of the same PIN differ
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(verify_pin(&a, "1234"));
        assert!(verify_pin(&b, "1234"));
        assert!(!verify_pin(&a, "0000"));
    }

    #[test]
    fn verify_pin_rejects_garbage_hash() {
        assert!(!verify_pin("MTIzNA==", "1234"));
        assert!(!verify_pin("", "1234"));
    }

    #[test]
    fn verify_distinguishes_not_found_from_pin_mismatch_internally() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap();
        ensure_default_users(root).unwrap();

        let ok = verify(root, "1001", "1234").unwrap();
        assert_eq!(ok.role, Role::Admin);

        let missing = verify(root, "9999", "1234").unwrap_err();
        assert!(matches!(missing, AuthError::NotFound { .. }));

        let wrong = verify(root, "1001", "0000").unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials { .. }));
    }

    #[test]
    fn seeding_is_idempotent() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap();
        ensure_default_users(root).unwrap();
        alter_user(root, "1003", Some("9876"), None, None, None, None).unwrap();
        // A second seeding call must not clobber provisioned changes
        ensure_default_users(root).unwrap();
        assert!(verify(root, "1003", "9876").is_ok());
    }

    #[test]
    fn add_replaces_existing_employee_number() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_str().unwrap();
        ensure_default_users(root).unwrap();
        let replacement = User {
            id: 9,
            employee_number: "1003".into(),
            email: "new@camma.com".into(),
            role: Role::Manager,
            department: "Wholesale".into(),
            name: None,
        };
        add_user(root, replacement, "4321").unwrap();
        let users = list_users(root).unwrap();
        assert_eq!(users.iter().filter(|u| u.employee_number == "1003").count(), 1);
        assert!(verify(root, "1003", "1234").is_err());
        assert_eq!(verify(root, "1003", "4321").unwrap().role, Role::Manager);
    }
}
