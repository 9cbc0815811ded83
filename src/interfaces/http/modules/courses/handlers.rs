//! Course API handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::dto::UpdateCourseRequest;
use crate::domain::query::{Document, ResultEnvelope};
use crate::domain::Course;
use crate::interfaces::http::common::{ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::{AdvancedResults, CurrentUser};
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "Courses",
    params(
        ("select" = Option<String>, Query, description = "Comma separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma separated sort keys, `-` for descending"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 20"),
    ),
    responses((status = 200, description = "Filtered, paginated courses", body = ResultEnvelope))
)]
pub async fn list_courses(
    Extension(AdvancedResults(envelope)): Extension<AdvancedResults>,
) -> Json<ResultEnvelope> {
    Json(envelope)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with its bootcamp name and description", body = ApiResponse<Course>),
        (status = 404, description = "No course exists with provided id.")
    )
)]
pub async fn get_course(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let course = state.courses.get(&id).await?;
    Ok(Json(ApiResponse::success(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = ApiResponse<Course>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No course exists with provided id.")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_course(
    State(state): State<ApiState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateCourseRequest>,
) -> Result<Json<ApiResponse<Course>>, ApiError> {
    let course = state.courses.update(&user, &id, request.into()).await?;
    Ok(Json(ApiResponse::success(course)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No course exists with provided id.")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_course(
    State(state): State<ApiState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    state.courses.delete(&user, &id).await?;
    Ok(Json(ApiResponse::success(EmptyData::default())))
}
