//! Bootcamp storage.
//!
//! The Postgres implementation translates [`BootcampQuery`] into SQL with
//! `QueryBuilder`; the in-memory one evaluates the same query in process.
//! Radius search uses the haversine distance on both sides.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use devcamp_bootcamps::{
    Bootcamp, BootcampQuery, Career, Comparison, Filter, FlagField, Location, NumericField, Page,
    SortField, TextField,
};
use devcamp_core::{BootcampId, CenterSphere, EARTH_RADIUS_MILES, UserId};

use super::BootcampRepository;
use super::memory::InMemoryStore;
use crate::error::{StoreError, map_sqlx_error};

const NAME_KEY: &str = "bootcamps_name_key";

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryBootcampRepository {
    store: InMemoryStore<Bootcamp>,
}

impl InMemoryBootcampRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BootcampRepository for InMemoryBootcampRepository {
    async fn insert(&self, bootcamp: &Bootcamp) -> Result<(), StoreError> {
        self.store
            .upsert_unique(bootcamp.clone(), |a, b| a.name == b.name, NAME_KEY)
    }

    async fn get(&self, id: BootcampId) -> Result<Option<Bootcamp>, StoreError> {
        Ok(self.store.get(&id))
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Option<Bootcamp>, StoreError> {
        Ok(self.store.find(|b| b.user == owner))
    }

    async fn update(&self, bootcamp: &Bootcamp) -> Result<(), StoreError> {
        self.store
            .replace_unique(bootcamp.clone(), |a, b| a.name == b.name, NAME_KEY)
            .map(|_| ())
    }

    async fn delete(&self, id: BootcampId) -> Result<bool, StoreError> {
        Ok(self.store.remove(&id))
    }

    async fn set_photo(&self, id: BootcampId, photo: &str) -> Result<(), StoreError> {
        self.store.modify(&id, |b| b.photo = photo.to_string());
        Ok(())
    }

    async fn list(&self, query: &BootcampQuery) -> Result<Page<Bootcamp>, StoreError> {
        Ok(query.apply(&self.store.values()))
    }

    async fn within(&self, region: CenterSphere) -> Result<Vec<Bootcamp>, StoreError> {
        let mut found: Vec<Bootcamp> = self
            .store
            .values()
            .into_iter()
            .filter(|b| b.location.as_ref().is_some_and(|l| region.contains(&l.point())))
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Postgres
// ─────────────────────────────────────────────────────────────────────────────

const COLUMNS: &str = "id, name, slug, description, website, phone, email, location, careers, \
     average_rating, average_cost, photo, housing, job_assistance, job_guarantee, accept_gi, \
     user_id, created_at";

#[derive(Debug, Clone)]
pub struct PostgresBootcampRepository {
    pool: PgPool,
}

impl PostgresBootcampRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BootcampRepository for PostgresBootcampRepository {
    #[instrument(skip(self, bootcamp), fields(bootcamp_id = %bootcamp.id), err)]
    async fn insert(&self, bootcamp: &Bootcamp) -> Result<(), StoreError> {
        let sql = r#"
            INSERT INTO bootcamps (
                id, name, slug, description, website, phone, email, location,
                longitude, latitude, city, state, zipcode, careers,
                average_rating, average_cost, photo,
                housing, job_assistance, job_guarantee, accept_gi,
                user_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23)
        "#;
        bind_bootcamp(sqlx::query(sql), bootcamp)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_bootcamp", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(bootcamp_id = %id), err)]
    async fn get(&self, id: BootcampId) -> Result<Option<Bootcamp>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM bootcamps WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_bootcamp", e))?;
        row.as_ref().map(decode_bootcamp).transpose()
    }

    #[instrument(skip(self), fields(user_id = %owner), err)]
    async fn find_by_owner(&self, owner: UserId) -> Result<Option<Bootcamp>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM bootcamps WHERE user_id = $1 LIMIT 1"
        ))
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_bootcamp_by_owner", e))?;
        row.as_ref().map(decode_bootcamp).transpose()
    }

    #[instrument(skip(self, bootcamp), fields(bootcamp_id = %bootcamp.id), err)]
    async fn update(&self, bootcamp: &Bootcamp) -> Result<(), StoreError> {
        let sql = r#"
            UPDATE bootcamps SET
                name = $2, slug = $3, description = $4, website = $5, phone = $6,
                email = $7, location = $8, longitude = $9, latitude = $10,
                city = $11, state = $12, zipcode = $13, careers = $14,
                average_rating = $15, average_cost = $16, photo = $17,
                housing = $18, job_assistance = $19, job_guarantee = $20,
                accept_gi = $21, user_id = $22, created_at = $23
            WHERE id = $1
        "#;
        bind_bootcamp(sqlx::query(sql), bootcamp)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_bootcamp", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(bootcamp_id = %id), err)]
    async fn delete(&self, id: BootcampId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM bootcamps WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_bootcamp", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(bootcamp_id = %id), err)]
    async fn set_photo(&self, id: BootcampId, photo: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE bootcamps SET photo = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(photo)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_bootcamp_photo", e))?;
        Ok(())
    }

    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit), err)]
    async fn list(&self, query: &BootcampQuery) -> Result<Page<Bootcamp>, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bootcamps WHERE TRUE");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_bootcamps", e))?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM bootcamps WHERE TRUE"));
        push_filters(&mut select, query);
        push_order(&mut select, query);
        select
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_bootcamps", e))?;

        let items = rows.iter().map(decode_bootcamp).collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    #[instrument(skip(self), err)]
    async fn within(&self, region: CenterSphere) -> Result<Vec<Bootcamp>, StoreError> {
        let sql = within_sql();
        let rows = sqlx::query(&sql)
            .bind(region.center.longitude)
            .bind(region.center.latitude)
            .bind(region.radius_radians)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("bootcamps_within", e))?;

        tracing::debug!(
            found = rows.len(),
            radius_miles = region.radius_radians * EARTH_RADIUS_MILES,
            "radius search"
        );
        rows.iter().map(decode_bootcamp).collect()
    }
}

/// Binds `$1..$23` in the column order shared by the insert and update statements.
fn bind_bootcamp<'q>(
    query: Query<'q, Postgres, PgArguments>,
    b: &'q Bootcamp,
) -> Query<'q, Postgres, PgArguments> {
    let location = b.location.as_ref();
    let careers: Vec<String> = b.careers.iter().map(|c| c.as_str().to_string()).collect();

    query
        .bind(b.id.as_uuid())
        .bind(&b.name)
        .bind(&b.slug)
        .bind(&b.description)
        .bind(b.website.as_deref())
        .bind(b.phone.as_deref())
        .bind(b.email.as_deref())
        .bind(location.map(Json))
        .bind(location.map(|l| l.coordinates[0]))
        .bind(location.map(|l| l.coordinates[1]))
        .bind(location.and_then(|l| l.city.as_deref()))
        .bind(location.and_then(|l| l.state.as_deref()))
        .bind(location.and_then(|l| l.zipcode.as_deref()))
        .bind(careers)
        .bind(b.average_rating)
        .bind(b.average_cost)
        .bind(&b.photo)
        .bind(b.housing)
        .bind(b.job_assistance)
        .bind(b.job_guarantee)
        .bind(b.accept_gi)
        .bind(b.user.as_uuid())
        .bind(b.created_at)
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &BootcampQuery) {
    for filter in &query.filters {
        qb.push(" AND ");
        match filter {
            Filter::Number { field, op, value } => {
                qb.push(numeric_column(*field))
                    .push(comparison_sql(*op))
                    .push_bind(*value);
            }
            Filter::NumberIn { field, values } => {
                qb.push(numeric_column(*field))
                    .push(" = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            Filter::Flag { field, value } => {
                qb.push(flag_column(*field)).push(" = ").push_bind(*value);
            }
            Filter::Text { field, values } => {
                qb.push(text_column(*field))
                    .push(" = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            Filter::Careers(careers) => {
                let careers: Vec<String> = careers.iter().map(|c| c.as_str().to_string()).collect();
                qb.push("careers && ").push_bind(careers);
            }
            Filter::Owner(user) => {
                qb.push("user_id = ").push_bind(*user.as_uuid());
            }
        }
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, query: &BootcampQuery) {
    qb.push(" ORDER BY ");
    for key in &query.sort {
        let column = match key.field {
            SortField::Name => "name",
            SortField::AverageCost => "average_cost",
            SortField::AverageRating => "average_rating",
            SortField::CreatedAt => "created_at",
        };
        let direction = if key.descending {
            " DESC NULLS LAST, "
        } else {
            " ASC NULLS FIRST, "
        };
        qb.push(column).push(direction);
    }
    qb.push("id ASC");
}

fn numeric_column(field: NumericField) -> &'static str {
    match field {
        NumericField::AverageCost => "average_cost",
        NumericField::AverageRating => "average_rating",
    }
}

fn flag_column(field: FlagField) -> &'static str {
    match field {
        FlagField::Housing => "housing",
        FlagField::JobAssistance => "job_assistance",
        FlagField::JobGuarantee => "job_guarantee",
        FlagField::AcceptGi => "accept_gi",
    }
}

fn text_column(field: TextField) -> &'static str {
    match field {
        TextField::Name => "name",
        TextField::City => "city",
        TextField::State => "state",
        TextField::Zipcode => "zipcode",
    }
}

fn comparison_sql(op: Comparison) -> &'static str {
    match op {
        Comparison::Eq => " = ",
        Comparison::Gt => " > ",
        Comparison::Gte => " >= ",
        Comparison::Lt => " < ",
        Comparison::Lte => " <= ",
    }
}

/// Haversine central angle compared against the radius in radians. The sine
/// term is clamped to 1 like [`devcamp_core::GeoPoint::angular_distance`].
fn within_sql() -> String {
    format!(
        r#"
        SELECT {COLUMNS} FROM bootcamps
        WHERE longitude IS NOT NULL AND latitude IS NOT NULL
          AND 2 * ASIN(LEAST(1.0, SQRT(
                POWER(SIN(RADIANS(latitude - $2) / 2), 2)
              + COS(RADIANS($2)) * COS(RADIANS(latitude))
              * POWER(SIN(RADIANS(longitude - $1) / 2), 2)
          ))) <= $3
        ORDER BY created_at ASC
        "#
    )
}

struct BootcampRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    location: Option<Json<Location>>,
    careers: Vec<String>,
    average_rating: Option<f64>,
    average_cost: Option<f64>,
    photo: String,
    housing: bool,
    job_assistance: bool,
    job_guarantee: bool,
    accept_gi: bool,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for BootcampRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(BootcampRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            website: row.try_get("website")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            location: row.try_get("location")?,
            careers: row.try_get("careers")?,
            average_rating: row.try_get("average_rating")?,
            average_cost: row.try_get("average_cost")?,
            photo: row.try_get("photo")?,
            housing: row.try_get("housing")?,
            job_assistance: row.try_get("job_assistance")?,
            job_guarantee: row.try_get("job_guarantee")?,
            accept_gi: row.try_get("accept_gi")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<BootcampRow> for Bootcamp {
    type Error = StoreError;

    fn try_from(row: BootcampRow) -> Result<Self, Self::Error> {
        let careers = row
            .careers
            .iter()
            .map(|c| c.parse::<Career>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Corrupt(format!("bootcamp {}: {e}", row.id)))?;

        Ok(Bootcamp {
            id: BootcampId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            website: row.website,
            phone: row.phone,
            email: row.email,
            location: row.location.map(|Json(l)| l),
            careers,
            average_rating: row.average_rating,
            average_cost: row.average_cost,
            photo: row.photo,
            housing: row.housing,
            job_assistance: row.job_assistance,
            job_guarantee: row.job_guarantee,
            accept_gi: row.accept_gi,
            user: UserId::from_uuid(row.user_id),
            created_at: row.created_at,
        })
    }
}

fn decode_bootcamp(row: &PgRow) -> Result<Bootcamp, StoreError> {
    let row = <BootcampRow as sqlx::FromRow<'_, PgRow>>::from_row(row)
        .map_err(|e| map_sqlx_error("decode_bootcamp", e))?;
    Bootcamp::try_from(row)
}
