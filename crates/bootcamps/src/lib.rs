//! The bootcamp listing domain.
//!
//! Records, validated inputs, photo rules and the list query model. No IO.

pub mod bootcamp;
pub mod photo;
pub mod query;

pub use bootcamp::{Bootcamp, BootcampFields, Career, CreateBootcamp, Location, UpdateBootcamp, slugify};
pub use photo::{DEFAULT_PHOTO, photo_file_name, validate_photo};
pub use query::{
    BootcampQuery, Comparison, FlagField, Filter, NumericField, Page, PageRef, Pagination, SortField,
    SortKey, TextField,
};
