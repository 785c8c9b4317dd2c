use serde::{Deserialize, Serialize};

/// Closed set of dashboard roles. Route allow-lists and the user registry
/// only ever speak in these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Some(Role::Employee),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Identity record for one employee. Created by administrative provisioning
/// and never mutated by the session flow itself.
///
/// Field names serialize camelCase so the persisted slot carries the wire
/// shape `{id, employeeNumber, email, role, department, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub employee_number: String,
    pub email: String,
    pub role: Role,
    /// Open-ended, unlike the role set
    pub department: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trip() {
        for r in [Role::Employee, Role::Manager, Role::Admin] {
            assert_eq!(Role::parse(r.as_str()), Some(r));
        }
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn user_serializes_with_camel_case_wire_shape() {
        let u = User {
            id: 1,
            employee_number: "1001".into(),
            email: "admin@camma.com".into(),
            role: Role::Admin,
            department: "Digital Marketing".into(),
            name: Some("Admin User".into()),
        };
        let v: serde_json::Value = serde_json::to_value(&u).unwrap();
        assert_eq!(v["employeeNumber"], "1001");
        assert_eq!(v["role"], "admin");
        assert_eq!(v["name"], "Admin User");
        let back: User = serde_json::from_value(v).unwrap();
        assert_eq!(back, u);
    }

    #[test]
    fn user_name_is_optional_on_the_wire() {
        let raw = r#"{"id":7,"employeeNumber":"1007","email":"x@camma.com","role":"employee","department":"Accounting"}"#;
        let u: User = serde_json::from_str(raw).unwrap();
        assert_eq!(u.name, None);
    }
}
