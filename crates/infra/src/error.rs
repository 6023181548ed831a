//! Storage error model.
//!
//! SQLx errors are mapped as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | anything else | - | `Database` |

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field (bootcamp name, user email) already exists.
    #[error("duplicate value for {0}")]
    Duplicate(String),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unique key").to_string();
            return StoreError::Duplicate(constraint);
        }
    }
    StoreError::Database { operation, source: err }
}
