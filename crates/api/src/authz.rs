//! Authorization guards applied by handlers before touching the store.

use devcamp_auth::{Role, ensure_owner_or_admin, require_role};
use devcamp_bootcamps::Bootcamp;

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

/// Roles that may publish and manage bootcamps.
pub const PUBLISHER_ROLES: &[Role] = &[Role::User, Role::Admin];

pub fn require_roles(user: &CurrentUser, roles: &[Role]) -> Result<(), ApiError> {
    require_role(&user.principal(), roles)?;
    Ok(())
}

/// The caller must own `bootcamp` or be an admin.
pub fn authorize_bootcamp(
    user: &CurrentUser,
    bootcamp: &Bootcamp,
    action: &'static str,
) -> Result<(), ApiError> {
    ensure_owner_or_admin(&user.principal(), bootcamp.user, action, "bootcamp")?;
    Ok(())
}
