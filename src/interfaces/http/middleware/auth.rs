//! Authentication and role guards
//!
//! `auth_middleware` resolves the caller from `Authorization: Bearer <jwt>`
//! or the `token` cookie and stores [`CurrentUser`] in the request
//! extensions. `require_publisher_or_admin` runs after it.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::UserService;
use crate::domain::access::{ensure_role, NOT_AUTHORIZED};
use crate::domain::{DomainError, User, UserRepositoryInterface, UserRole};
use crate::interfaces::http::common::cookies::token_from_cookies;
use crate::interfaces::http::common::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<UserService<dyn UserRepositoryInterface>>,
}

/// The authenticated caller. Extract with `Extension<CurrentUser>`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

fn bearer_token(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn unauthorized() -> Response {
    ApiError(DomainError::Unauthorized(NOT_AUTHORIZED.into())).into_response()
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(&request).or_else(|| token_from_cookies(request.headers()));
    let Some(token) = token else {
        return unauthorized();
    };

    match state.users.authenticate(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(e @ DomainError::Storage(_)) => ApiError(e).into_response(),
        Err(_) => unauthorized(),
    }
}

async fn require_roles(allowed: &[UserRole], request: Request<Body>, next: Next) -> Response {
    let Some(CurrentUser(user)) = request.extensions().get::<CurrentUser>() else {
        return unauthorized();
    };
    if let Err(e) = ensure_role(user, allowed) {
        return ApiError(e).into_response();
    }
    next.run(request).await
}

pub async fn require_publisher_or_admin(request: Request<Body>, next: Next) -> Response {
    require_roles(&[UserRole::Publisher, UserRole::Admin], request, next).await
}
