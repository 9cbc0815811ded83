//! Authentication API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;

use super::dto::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, TokenResponse,
};
use crate::application::AuthResult;
use crate::domain::User;
use crate::interfaces::http::common::cookies::{set_cookie_header, CookieSettings};
use crate::interfaces::http::common::{ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;
use crate::interfaces::http::state::ApiState;

/// `{success, token}` plus the `token` cookie.
fn token_response(status: StatusCode, auth: AuthResult, cookies: &CookieSettings) -> Response {
    let cookie = cookies.token_cookie(&auth.token, Utc::now());
    let body = Json(TokenResponse {
        success: true,
        token: auth.token,
    });
    match set_cookie_header(&cookie) {
        Some(header) => (status, [header], body).into_response(),
        None => (status, body).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created and signed in", body = TokenResponse),
        (status = 400, description = "Validation error or duplicate email")
    )
)]
pub async fn register(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<Response, ApiError> {
    let auth = state.users.register(request.into()).await?;
    Ok(token_response(StatusCode::CREATED, auth, &state.cookies))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let auth = state
        .users
        .login(
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(token_response(StatusCode::OK, auth, &state.cookies))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/get-user",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<User>> {
    Json(ApiResponse::success(user))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset token issued", body = ApiResponse<User>),
        (status = 400, description = "No user with that email")
    )
)]
pub async fn forgot_password(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let reset = state.users.forgot_password(&request.email).await?;
    Ok(Json(ApiResponse::success(reset.user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/reset-password/{token}",
    tag = "Authentication",
    params(("token" = String, Path, description = "Raw reset token")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed and signed in", body = TokenResponse),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn reset_password(
    State(state): State<ApiState>,
    Path(token): Path<String>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> Result<Response, ApiError> {
    let auth = state.users.reset_password(&token, &request.password).await?;
    Ok(token_response(StatusCode::OK, auth, &state.cookies))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Token cookie cleared", body = ApiResponse<EmptyData>))
)]
pub async fn logout(State(state): State<ApiState>) -> Response {
    let cookie = state.cookies.cleared_cookie(Utc::now());
    let body = Json(ApiResponse::success(EmptyData::default()));
    match set_cookie_header(&cookie) {
        Some(header) => (StatusCode::OK, [header], body).into_response(),
        None => (StatusCode::OK, body).into_response(),
    }
}
