//! Authentication and authorization for DevCamp users.
//!
//! No HTTP or storage types live here.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod reset_token;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, ensure_owner_or_admin, require_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtIssuer, JwtValidator, TokenIssueError};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use reset_token::{RESET_TOKEN_TTL_MINUTES, ResetToken};
pub use roles::Role;
pub use user::{NewUser, User, UserDetailsUpdate};
