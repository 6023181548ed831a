use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Multipart, Path, Query, multipart::MultipartRejection},
    extract::rejection::QueryRejection,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Utc;
use tracing::{info, warn};

use devcamp_bootcamps::{
    Bootcamp, BootcampFields, BootcampQuery, CreateBootcamp, Location, UpdateBootcamp,
    photo_file_name, validate_photo,
};
use devcamp_core::{BootcampId, CenterSphere, radius_from_miles};

use crate::app::dto::{self, ApiJson};
use crate::app::errors::{self, ApiError};
use crate::app::services::AppServices;
use crate::authz::{PUBLISHER_ROLES, authorize_bootcamp, require_roles};
use crate::context::CurrentUser;
use crate::middleware::{AuthState, auth_middleware};

pub fn router(auth: AuthState) -> Router {
    let public = Router::new()
        .route("/", get(list_bootcamps))
        .route("/:id", get(get_bootcamp))
        .route("/radius/:zipcode/:distance", get(bootcamps_in_radius));

    let protected = Router::new()
        .route("/", axum::routing::post(create_bootcamp))
        .route("/:id", put(update_bootcamp).delete(delete_bootcamp))
        .route("/:id/photo", put(upload_photo))
        .route_layer(from_fn_with_state(auth, auth_middleware));

    public.merge(protected)
}

fn parse_id(raw: &str) -> Result<BootcampId, ApiError> {
    Ok(raw.parse()?)
}

async fn load(services: &AppServices, raw_id: &str) -> Result<Bootcamp, ApiError> {
    let id = parse_id(raw_id)?;
    services
        .bootcamps
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Bootcamp not found with id of {raw_id}")))
}

/// Geocode an address for a write. A miss or a provider failure leaves the
/// bootcamp without a location.
async fn locate(services: &AppServices, address: &str) -> Option<Location> {
    match services.geocoder.geocode(address).await {
        Ok(Some(location)) => Some(location),
        Ok(None) => {
            warn!(address, "address could not be geocoded");
            None
        }
        Err(e) => {
            warn!(address, error = %e, "geocoder failed");
            None
        }
    }
}

pub async fn list_bootcamps(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(pairs) = params?;
    let query = BootcampQuery::from_pairs(pairs)?;
    let page = services.bootcamps.list(&query).await?;

    let data = page
        .items
        .iter()
        .map(|b| serde_json::to_value(b).map(|v| query.project(v)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::internal("serializing bootcamps", e))?;

    Ok(axum::Json(dto::ListResponse {
        success: true,
        count: data.len(),
        pagination: query.pagination(page.total),
        data,
    }))
}

pub async fn get_bootcamp(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bootcamp = load(&services, &id).await?;
    Ok(dto::ok_with("Fetch bootcamp data successfully", bootcamp))
}

pub async fn create_bootcamp(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(fields): ApiJson<BootcampFields>,
) -> Result<impl IntoResponse, ApiError> {
    require_roles(&user, PUBLISHER_ROLES)?;
    let principal = user.principal();

    if !principal.is_admin() && services.bootcamps.find_by_owner(principal.user_id).await?.is_some() {
        return Err(ApiError::BadRequest(format!(
            "The user with ID {} has already published a bootcamp",
            principal.user_id
        )));
    }

    let cmd = CreateBootcamp::new(fields)?;
    let location = locate(&services, &cmd.address).await;
    let bootcamp = Bootcamp::create(cmd, principal.user_id, location, Utc::now());
    services.bootcamps.insert(&bootcamp).await?;

    info!(bootcamp_id = %bootcamp.id, user_id = %principal.user_id, "bootcamp created");
    Ok((
        StatusCode::CREATED,
        dto::ok_with("Bootcamp created successfully", bootcamp),
    ))
}

pub async fn update_bootcamp(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(fields): ApiJson<BootcampFields>,
) -> Result<impl IntoResponse, ApiError> {
    require_roles(&user, PUBLISHER_ROLES)?;
    let mut bootcamp = load(&services, &id).await?;
    authorize_bootcamp(&user, &bootcamp, "update")?;

    let update = UpdateBootcamp::new(fields)?;
    let location = match &update.address {
        Some(address) => locate(&services, address).await,
        None => None,
    };
    bootcamp.apply_update(update, location);
    services.bootcamps.update(&bootcamp).await?;

    Ok(dto::ok_with("Bootcamp updated successfully", bootcamp))
}

pub async fn delete_bootcamp(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_roles(&user, PUBLISHER_ROLES)?;
    let bootcamp = load(&services, &id).await?;
    authorize_bootcamp(&user, &bootcamp, "delete")?;

    services.bootcamps.delete(bootcamp.id).await?;
    info!(bootcamp_id = %bootcamp.id, "bootcamp deleted");
    Ok(dto::message_only("Bootcamp deleted successfully"))
}

pub async fn bootcamps_in_radius(
    Extension(services): Extension<Arc<AppServices>>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let distance: f64 = distance
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid distance `{distance}`")))?;
    let radius = radius_from_miles(distance)?;

    let center = services
        .geocoder
        .geocode(&zipcode)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No location found for zipcode {zipcode}")))?
        .point();

    let data = services
        .bootcamps
        .within(CenterSphere::new(center, radius))
        .await?;

    Ok(axum::Json(dto::CountedResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

pub async fn upload_photo(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_roles(&user, PUBLISHER_ROLES)?;
    let bootcamp = load(&services, &id).await?;
    authorize_bootcamp(&user, &bootcamp, "update")?;

    let max = services.settings.max_upload_bytes;
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| errors::multipart_error(e, max))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let original = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| errors::multipart_error(e, max))?;
        upload = Some((content_type, original, bytes));
        break;
    }

    let Some((content_type, original, bytes)) = upload else {
        return Err(ApiError::BadRequest("Please upload a file".to_string()));
    };
    validate_photo(content_type.as_deref(), bytes.len() as u64, max)?;

    let file_name = photo_file_name(bootcamp.id, &original);
    services.photos.save(&file_name, &bytes).await.map_err(|e| {
        tracing::error!(error = %e, file = %file_name, "photo write failed");
        ApiError::Internal("Problem with file upload".to_string())
    })?;
    services.bootcamps.set_photo(bootcamp.id, &file_name).await?;

    Ok(dto::ok_with("Photo added successfully", file_name))
}
