/// Role and ownership checks
///
/// Two access rules cover the whole API:
///
/// - **Admin-only**: user listing, user deletion, role changes
/// - **Self-or-admin**: reading or updating a specific user, and listing
///   another user's tasks
///
/// Task queries never check ownership up front. Instead [`ownership_scope`]
/// turns the caller into a query scope: admins see every row, regular users
/// only their own. A row outside the scope is indistinguishable from a row
/// that does not exist.

use crate::auth::middleware::AuthContext;

/// Error type for authorization failures
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller lacks the required privileges
    #[error("Insufficient privileges for this operation")]
    Forbidden,
}

/// Requires the caller to hold the admin role
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

/// Requires the caller to be the named user, or an admin
pub fn require_self_or_admin(auth: &AuthContext, user_id: i64) -> Result<(), AuthzError> {
    if auth.user_id == user_id || auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden)
    }
}

/// The ownership scope for task queries
///
/// `None` means unrestricted (admin); `Some(id)` restricts queries to rows
/// owned by that user.
pub fn ownership_scope(auth: &AuthContext) -> Option<i64> {
    if auth.is_admin() {
        None
    } else {
        Some(auth.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;

    fn admin() -> AuthContext {
        AuthContext {
            user_id: 1,
            role: Role::Admin,
        }
    }

    fn user(id: i64) -> AuthContext {
        AuthContext {
            user_id: id,
            role: Role::User,
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&admin()).is_ok());
        assert!(require_admin(&user(2)).is_err());
    }

    #[test]
    fn test_require_self_or_admin() {
        // Self
        assert!(require_self_or_admin(&user(5), 5).is_ok());
        // Admin acting on someone else
        assert!(require_self_or_admin(&admin(), 5).is_ok());
        // Third party
        assert!(require_self_or_admin(&user(5), 6).is_err());
    }

    #[test]
    fn test_ownership_scope() {
        assert_eq!(ownership_scope(&admin()), None);
        assert_eq!(ownership_scope(&user(5)), Some(5));
    }
}
