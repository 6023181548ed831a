use devcamp_auth::{Principal, User};

/// The authenticated user, loaded fresh from the store for this request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn principal(&self) -> Principal {
        Principal::new(self.0.id, self.0.role)
    }
}
