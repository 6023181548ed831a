use thiserror::Error;

use devcamp_core::UserId;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("User role {0} is not authorized to access this route")]
    RoleNotAllowed(Role),

    #[error("User {user_id} is not authorized to {action} this {resource}")]
    NotOwner {
        user_id: UserId,
        action: &'static str,
        resource: &'static str,
    },
}

/// Allow the principal only if its role is in `allowed`.
///
/// - No IO
/// - No panics
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::RoleNotAllowed(principal.role))
    }
}

/// Owner-or-admin check for mutating an owned resource.
pub fn ensure_owner_or_admin(
    principal: &Principal,
    owner: UserId,
    action: &'static str,
    resource: &'static str,
) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.user_id == owner {
        return Ok(());
    }
    Err(AuthzError::NotOwner {
        user_id: principal.user_id,
        action,
        resource,
    })
}
