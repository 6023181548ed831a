//! User account record and the validated inputs that create or change it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use devcamp_core::validate::is_email;
use devcamp_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

pub const MIN_PASSWORD_LEN: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A registered account.
///
/// Secrets are never serialized; the JSON form is the public profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expire: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl User {
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
    }

    pub fn set_reset_token(&mut self, digest: String, expires_at: DateTime<Utc>) {
        self.reset_password_token = Some(digest);
        self.reset_password_expire = Some(expires_at);
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_password_token = None;
        self.reset_password_expire = None;
    }

    /// True when `digest` is the stored reset digest and it has not expired.
    pub fn reset_token_matches(&self, digest: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_password_token, self.reset_password_expire) {
            (Some(stored), Some(expires)) => stored == digest && expires > now,
            _ => false,
        }
    }

    pub fn apply_details(&mut self, update: UserDetailsUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    /// Admins are provisioned out of band, so `role` may only be `user`.
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
        role: Option<Role>,
    ) -> DomainResult<Self> {
        let name = required_name(name)?;
        let email = normalize_email(email.as_deref().unwrap_or_default())?;
        let password = password.unwrap_or_default();
        validate_password(&password)?;

        let role = role.unwrap_or_default();
        if role == Role::Admin {
            return Err(DomainError::validation("Cannot register with the admin role"));
        }

        Ok(Self { name, email, password, role })
    }

    pub fn into_user(self, password_hash: String, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            name: self.name,
            email: self.email,
            role: self.role,
            password_hash,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: now,
        }
    }
}

/// Validated `update-details` input (absent fields stay unchanged).
#[derive(Debug, Clone, Default)]
pub struct UserDetailsUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserDetailsUpdate {
    pub fn new(name: Option<String>, email: Option<String>) -> DomainResult<Self> {
        let name = name.map(|n| required_name(Some(n))).transpose()?;
        let email = email.map(|e| normalize_email(&e)).transpose()?;
        Ok(Self { name, email })
    }
}

fn required_name(name: Option<String>) -> DomainResult<String> {
    let name = name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("Please add a name"));
    }
    Ok(name)
}

/// Trim + lowercase, then check the `local@domain.tld` shape.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_email(&email) {
        return Err(DomainError::validation("Please add a valid email"));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
