//! Bootcamp API handlers, including the nested course routes

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateBootcampRequest, UpdateBootcampRequest};
use crate::application::PhotoUpload;
use crate::domain::query::ResultEnvelope;
use crate::domain::{Bootcamp, Course, DomainError};
use crate::interfaces::http::common::{
    ApiError, ApiResponse, EmptyData, ListResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::{AdvancedResults, CurrentUser};
use crate::interfaces::http::modules::courses::CreateCourseRequest;
use crate::interfaces::http::state::ApiState;

/// Multipart field carrying the photo
pub const PHOTO_FIELD: &str = "file";

#[utoipa::path(
    get,
    path = "/api/v1/bootcamps",
    tag = "Bootcamps",
    params(
        ("select" = Option<String>, Query, description = "Comma separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma separated sort keys, `-` for descending"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 20"),
    ),
    responses((status = 200, description = "Filtered, paginated bootcamps with their courses", body = ResultEnvelope))
)]
pub async fn list_bootcamps(
    Extension(AdvancedResults(envelope)): Extension<AdvancedResults>,
) -> Json<ResultEnvelope> {
    Json(envelope)
}

#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}",
    tag = "Bootcamps",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Bootcamp", body = ApiResponse<Bootcamp>),
        (status = 404, description = "Bootcamp not found with provided id")
    )
)]
pub async fn get_bootcamp(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Bootcamp>>, ApiError> {
    let bootcamp = state.bootcamps.get(&id).await?;
    Ok(Json(ApiResponse::success(bootcamp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/bootcamps",
    tag = "Bootcamps",
    request_body = CreateBootcampRequest,
    responses(
        (status = 201, description = "Bootcamp created", body = ApiResponse<Bootcamp>),
        (status = 400, description = "Validation error, duplicate name or second bootcamp"),
        (status = 403, description = "Role not allowed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_bootcamp(
    State(state): State<ApiState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<CreateBootcampRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Bootcamp>>), ApiError> {
    let bootcamp = state.bootcamps.create(&user, request.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(bootcamp))))
}

#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}",
    tag = "Bootcamps",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = UpdateBootcampRequest,
    responses(
        (status = 200, description = "Updated bootcamp", body = ApiResponse<Bootcamp>),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Bootcamp not found with provided id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_bootcamp(
    State(state): State<ApiState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateBootcampRequest>,
) -> Result<Json<ApiResponse<Bootcamp>>, ApiError> {
    let bootcamp = state.bootcamps.update(&user, &id, request.into()).await?;
    Ok(Json(ApiResponse::success(bootcamp)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bootcamps/{id}",
    tag = "Bootcamps",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Bootcamp and its courses deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Bootcamp not found with provided id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_bootcamp(
    State(state): State<ApiState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.bootcamps.delete(&user, &id).await?;
    Ok(Json(ApiResponse::success(EmptyData::default())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/radius/{zipcode}/{distance}",
    tag = "Bootcamps",
    params(
        ("zipcode" = String, Path, description = "Center of the search"),
        ("distance" = f64, Path, description = "Radius in miles"),
    ),
    responses(
        (status = 200, description = "Bootcamps inside the radius", body = ListResponse<Bootcamp>),
        (status = 400, description = "Bad distance or unknown zipcode")
    )
)]
pub async fn bootcamps_in_radius(
    State(state): State<ApiState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<Json<ListResponse<Bootcamp>>, ApiError> {
    let distance: f64 = distance
        .trim()
        .parse()
        .map_err(|_| DomainError::validation("Distance must be a number"))?;
    let bootcamps = state.bootcamps.within_radius(&zipcode, distance).await?;
    Ok(Json(ListResponse::new(bootcamps)))
}

/// First `file` field of the form, if any.
async fn read_photo(mut multipart: Multipart) -> Result<Option<PhotoUpload>, DomainError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        DomainError::validation(format!("Invalid upload: {}", e.body_text()))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(invalid)?;
        if bytes.is_empty() && file_name.is_none() {
            return Ok(None);
        }
        return Ok(Some(PhotoUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}/photo",
    tag = "Bootcamps",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body(content_type = "multipart/form-data", description = "Image in the `file` field"),
    responses(
        (status = 200, description = "Stored file name", body = ApiResponse<String>),
        (status = 400, description = "Missing, non-image or oversized file"),
        (status = 403, description = "Permission denied."),
        (status = 404, description = "Bootcamp not found with provided id"),
        (status = 500, description = "Problem with file upload")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_bootcamp_photo(
    State(state): State<ApiState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let upload = read_photo(multipart).await?;
    let file_name = state.bootcamps.upload_photo(&user, &id, upload).await?;
    Ok(Json(ApiResponse::success(file_name)))
}

#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}/courses",
    tag = "Courses",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses((status = 200, description = "Courses of the bootcamp", body = ListResponse<Course>))
)]
pub async fn list_bootcamp_courses(
    State(state): State<ApiState>,
    Path(bootcamp_id): Path<String>,
) -> Result<Json<ListResponse<Course>>, ApiError> {
    let courses = state.courses.list_for_bootcamp(&bootcamp_id).await?;
    Ok(Json(ListResponse::new(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{id}/courses",
    tag = "Courses",
    params(("id" = String, Path, description = "Bootcamp id")),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = ApiResponse<Course>),
        (status = 403, description = "Permission Denied"),
        (status = 404, description = "No bootcamp exists with provided id.")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_course(
    State(state): State<ApiState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(bootcamp_id): Path<String>,
    ValidatedJson(request): ValidatedJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), ApiError> {
    let course = state.courses.add(&user, &bootcamp_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(course))))
}
