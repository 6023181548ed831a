//! Postgres connection pool and schema bootstrap.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{StoreError, map_sqlx_error};

/// Idempotent schema. Coordinates are duplicated out of the JSON location so
/// radius search can run in SQL.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id                     UUID PRIMARY KEY,
    name                   TEXT NOT NULL,
    email                  TEXT NOT NULL,
    role                   TEXT NOT NULL,
    password_hash          TEXT NOT NULL,
    reset_password_token   TEXT,
    reset_password_expire  TIMESTAMPTZ,
    created_at             TIMESTAMPTZ NOT NULL,
    CONSTRAINT users_email_key UNIQUE (email)
);

CREATE INDEX IF NOT EXISTS users_reset_password_token_idx
    ON users (reset_password_token)
    WHERE reset_password_token IS NOT NULL;

CREATE TABLE IF NOT EXISTS bootcamps (
    id              UUID PRIMARY KEY,
    name            TEXT NOT NULL,
    slug            TEXT NOT NULL,
    description     TEXT NOT NULL,
    website         TEXT,
    phone           TEXT,
    email           TEXT,
    location        JSONB,
    longitude       DOUBLE PRECISION,
    latitude        DOUBLE PRECISION,
    city            TEXT,
    state           TEXT,
    zipcode         TEXT,
    careers         TEXT[] NOT NULL,
    average_rating  DOUBLE PRECISION,
    average_cost    DOUBLE PRECISION,
    photo           TEXT NOT NULL,
    housing         BOOLEAN NOT NULL DEFAULT FALSE,
    job_assistance  BOOLEAN NOT NULL DEFAULT FALSE,
    job_guarantee   BOOLEAN NOT NULL DEFAULT FALSE,
    accept_gi       BOOLEAN NOT NULL DEFAULT FALSE,
    user_id         UUID NOT NULL REFERENCES users (id),
    created_at      TIMESTAMPTZ NOT NULL,
    CONSTRAINT bootcamps_name_key UNIQUE (name)
);

CREATE INDEX IF NOT EXISTS bootcamps_user_id_idx ON bootcamps (user_id);
CREATE INDEX IF NOT EXISTS bootcamps_created_at_idx ON bootcamps (created_at DESC);
"#;

pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    info!("postgres connected");
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}
