//! Shared domain primitives: ids, errors, geometry and input checks.

pub mod entity;
pub mod error;
pub mod geo;
pub mod id;
pub mod validate;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use geo::{CenterSphere, EARTH_RADIUS_MILES, GeoPoint, radius_from_miles};
pub use id::{BootcampId, UserId};
