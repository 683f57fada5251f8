/// User roles
///
/// Every user holds exactly one role. `Admin` bypasses ownership checks on
/// task reads, updates and deletes; it does not change the "owner is forced
/// to the caller" rule on task creation.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('user', 'admin');
/// ```

use serde::{Deserialize, Serialize};

/// Role tag attached to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular user: may only act on tasks they own
    User,

    /// Administrator: may act on any user's tasks and manage roles
    Admin,
}

impl Role {
    /// Resolves a role from a client-supplied name
    ///
    /// A case-insensitive `"admin"` maps to [`Role::Admin`]; every other
    /// value maps to [`Role::User`]. Used both at registration and when an
    /// administrator changes a user's role, so the two paths cannot diverge.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Role name as exposed on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// True for [`Role::Admin`]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Role::from_name("admin"), Role::Admin);
        assert_eq!(Role::from_name("ADMIN"), Role::Admin);
        assert_eq!(Role::from_name("Admin"), Role::Admin);
    }

    #[test]
    fn test_from_name_defaults_to_user() {
        assert_eq!(Role::from_name("user"), Role::User);
        assert_eq!(Role::from_name("moderator"), Role::User);
        assert_eq!(Role::from_name(""), Role::User);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Role::User.as_str(), "USER");
        assert_eq!(Role::Admin.as_str(), "ADMIN");
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_serde_uses_uppercase_names() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");

        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
