//! Repositories for the two persisted records.
//!
//! Each trait has an in-memory implementation (development, tests) and a
//! Postgres implementation. Both answer list and radius queries identically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use devcamp_auth::User;
use devcamp_bootcamps::{Bootcamp, BootcampQuery, Page};
use devcamp_core::{BootcampId, CenterSphere, UserId};

use crate::StoreError;

pub mod bootcamps;
pub mod memory;
pub mod users;

pub use bootcamps::{InMemoryBootcampRepository, PostgresBootcampRepository};
pub use memory::InMemoryStore;
pub use users::{InMemoryUserRepository, PostgresUserRepository};

#[async_trait]
pub trait BootcampRepository: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the name is taken.
    async fn insert(&self, bootcamp: &Bootcamp) -> Result<(), StoreError>;

    async fn get(&self, id: BootcampId) -> Result<Option<Bootcamp>, StoreError>;

    /// Any bootcamp published by `owner`.
    async fn find_by_owner(&self, owner: UserId) -> Result<Option<Bootcamp>, StoreError>;

    /// Replace the stored record. Fails with [`StoreError::Duplicate`] on a name clash.
    async fn update(&self, bootcamp: &Bootcamp) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: BootcampId) -> Result<bool, StoreError>;

    async fn set_photo(&self, id: BootcampId, photo: &str) -> Result<(), StoreError>;

    async fn list(&self, query: &BootcampQuery) -> Result<Page<Bootcamp>, StoreError>;

    /// Every located bootcamp inside `region`.
    async fn within(&self, region: CenterSphere) -> Result<Vec<Bootcamp>, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// The user holding this reset digest, provided it has not expired at `now`.
    async fn find_by_reset_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    async fn update(&self, user: &User) -> Result<(), StoreError>;
}
