//! Router state shared by every handler

use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use super::common::cookies::CookieSettings;
use super::middleware::AuthState;
use crate::application::{BootcampService, CourseService, UserService};
use crate::domain::{RepositoryProvider, UserRepositoryInterface};

#[derive(Clone)]
pub struct ApiState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub users: Arc<UserService<dyn UserRepositoryInterface>>,
    pub bootcamps: Arc<BootcampService>,
    pub courses: Arc<CourseService>,
    pub cookies: CookieSettings,
    /// Largest accepted photo, in bytes
    pub max_upload: usize,
    pub started_at: Arc<Instant>,
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        AuthState {
            users: Arc::clone(&s.users),
        }
    }
}
