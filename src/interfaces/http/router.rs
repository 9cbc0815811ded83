//! API Router with Swagger UI

use std::path::PathBuf;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue},
    middleware,
    routing::{get, post, put, MethodRouter},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, EmptyData, ListResponse};
use super::middleware::{
    advanced_results_middleware, auth_middleware, http_metrics_middleware,
    request_id_middleware, require_publisher_or_admin, AdvancedResultsState, AuthState,
};
use super::modules::metrics::{prometheus_metrics, MetricsState};
use super::modules::{auth, bootcamps, courses, health};
use super::state::ApiState;
use crate::application::courses::service::bootcamp_relation;
use crate::domain::bootcamp::{self, Bootcamp};
use crate::domain::course::{self, Course};
use crate::domain::geo::GeoLocation;
use crate::domain::query::{PageLink, PaginationResult, RelationSpec, ResultEnvelope};
use crate::domain::{Career, MinimumSkill, User, UserRole};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from login/register; the `token` cookie also works"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::get_current_user,
        auth::forgot_password,
        auth::reset_password,
        auth::logout,
        bootcamps::list_bootcamps,
        bootcamps::get_bootcamp,
        bootcamps::create_bootcamp,
        bootcamps::update_bootcamp,
        bootcamps::delete_bootcamp,
        bootcamps::bootcamps_in_radius,
        bootcamps::upload_bootcamp_photo,
        bootcamps::list_bootcamp_courses,
        bootcamps::add_course,
        courses::list_courses,
        courses::get_course,
        courses::update_course,
        courses::delete_course,
    ),
    components(
        schemas(
            ApiResponse<String>,
            ApiResponse<User>,
            ApiResponse<Bootcamp>,
            ApiResponse<Course>,
            ApiResponse<EmptyData>,
            ListResponse<Bootcamp>,
            ListResponse<Course>,
            EmptyData,
            ResultEnvelope,
            PaginationResult,
            PageLink,
            User,
            UserRole,
            Bootcamp,
            Career,
            GeoLocation,
            Course,
            MinimumSkill,
            health::HealthResponse,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::ForgotPasswordRequest,
            auth::ResetPasswordRequest,
            auth::TokenResponse,
            bootcamps::CreateBootcampRequest,
            bootcamps::UpdateBootcampRequest,
            courses::CreateCourseRequest,
            courses::UpdateCourseRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Registration, login (JWT + cookie), password reset"),
        (name = "Bootcamps", description = "Bootcamp CRUD, radius search and photo upload"),
        (name = "Courses", description = "Courses offered by bootcamps"),
    ),
    info(
        title = "Bootcamp Directory API",
        version = "1.0.0",
        description = "REST API for bootcamps, their courses and user accounts",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Non-state router settings
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Served at `/` for anything no route matches
    pub public_dir: Option<PathBuf>,
    /// Mounts `GET /metrics` when present
    pub metrics: Option<PrometheusHandle>,
}

/// Authenticated callers only.
fn authenticated(router: MethodRouter<ApiState>, state: &ApiState) -> MethodRouter<ApiState> {
    router.route_layer(middleware::from_fn_with_state(
        AuthState::from_ref(state),
        auth_middleware,
    ))
}

/// Authenticated publishers and admins only.
fn publishers(router: MethodRouter<ApiState>, state: &ApiState) -> MethodRouter<ApiState> {
    authenticated(
        router.route_layer(middleware::from_fn(require_publisher_or_admin)),
        state,
    )
}

/// Runs the advanced-results query over `collection` before the handler.
fn advanced(
    router: MethodRouter<ApiState>,
    state: &ApiState,
    collection: &str,
    relations: Vec<RelationSpec>,
) -> MethodRouter<ApiState> {
    let results = AdvancedResultsState::new(state.repos.collection(collection), relations);
    router.route_layer(middleware::from_fn_with_state(
        results,
        advanced_results_middleware,
    ))
}

/// Create the API router with all routes
pub fn create_api_router(state: ApiState, options: RouterOptions) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/get-user",
            authenticated(get(auth::get_current_user), &state),
        )
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/{token}", put(auth::reset_password))
        .route("/logout", get(auth::logout));

    let bootcamp_list = advanced(
        get(bootcamps::list_bootcamps),
        &state,
        bootcamp::COLLECTION,
        vec![RelationSpec::has_many("courses", course::COLLECTION, "bootcamp")],
    );
    let photo_limit = DefaultBodyLimit::max(state.max_upload.saturating_add(64 * 1024));

    let bootcamp_routes = Router::new()
        .route(
            "/",
            bootcamp_list.merge(publishers(post(bootcamps::create_bootcamp), &state)),
        )
        .route(
            "/radius/{zipcode}/{distance}",
            get(bootcamps::bootcamps_in_radius),
        )
        .route(
            "/{id}",
            get(bootcamps::get_bootcamp).merge(publishers(
                put(bootcamps::update_bootcamp).delete(bootcamps::delete_bootcamp),
                &state,
            )),
        )
        .route(
            "/{id}/photo",
            publishers(
                put(bootcamps::upload_bootcamp_photo).route_layer(photo_limit),
                &state,
            ),
        )
        .route(
            "/{id}/courses",
            get(bootcamps::list_bootcamp_courses)
                .merge(publishers(post(bootcamps::add_course), &state)),
        );

    let course_list = advanced(
        get(courses::list_courses),
        &state,
        course::COLLECTION,
        vec![bootcamp_relation()],
    );
    let course_routes = Router::new().route("/", course_list).route(
        "/{id}",
        get(courses::get_course).merge(publishers(
            put(courses::update_course).delete(courses::delete_course),
            &state,
        )),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/bootcamps", bootcamp_routes)
        .nest("/api/v1/courses", course_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if let Some(handle) = options.metrics {
        router = router.route(
            "/metrics",
            get(prometheus_metrics).with_state(MetricsState { handle }),
        );
    }
    if let Some(public_dir) = options.public_dir {
        router = router.fallback_service(ServeDir::new(public_dir));
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
