//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database init, migrations,
//! default admin, REST API, metrics and graceful shutdown. The service
//! binary and the `bootcamp serve` CLI command both start through it.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{BootcampService, CourseService, UserService};
use crate::config::AppConfig;
use crate::domain::{RepositoryProvider, UserRepositoryInterface};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    build_geocoder, init_database, DatabaseConfig, PhotoStorage, StoreRepositoryProvider,
};
use crate::interfaces::http::common::cookies::CookieSettings;
use crate::interfaces::http::{create_api_router, ApiState, RouterOptions};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin account if it is missing (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// Handle to a running API server.
///
/// ```rust,no_run
/// use bootcamp_api::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Port actually bound (differs from config when it asked for 0).
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global metrics recorder can only be installed once per process.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    PROM_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("Failed to install Prometheus metrics recorder");
            info!("📊 Prometheus metrics recorder installed");
            handle
        })
        .clone()
}

/// Wires services and HTTP state from configuration and an open database.
pub fn build_state(app_cfg: &AppConfig, db: DatabaseConnection) -> ApiState {
    let repos: Arc<dyn RepositoryProvider> = Arc::new(StoreRepositoryProvider::sqlite(db));
    let users: Arc<dyn UserRepositoryInterface> = repos.users();
    let jwt_config = JwtConfig::from(&app_cfg.security);
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    let photos = PhotoStorage::from(&app_cfg.uploads);
    ApiState {
        repos: repos.clone(),
        users: Arc::new(UserService::new(users, jwt_config)),
        bootcamps: Arc::new(BootcampService::new(
            repos.clone(),
            build_geocoder(&app_cfg.geocoder),
            photos,
        )),
        courses: Arc::new(CourseService::new(repos)),
        cookies: CookieSettings {
            expire_days: app_cfg.security.cookie_expire_days,
            secure: app_cfg.is_production(),
        },
        max_upload: app_cfg.uploads.max_file_size,
        started_at: Arc::new(Instant::now()),
    }
}

/// Connects and, when asked, migrates the configured database.
pub async fn open_database(
    app_cfg: &AppConfig,
    auto_migrate: bool,
) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let db = init_database(&DatabaseConfig {
        url: app_cfg.database.url.clone(),
    })
    .await?;
    if auto_migrate {
        info!("Running database migrations...");
        Migrator::up(&db, None).await?;
        info!("Migrations completed");
    }
    Ok(db)
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!(
            environment = %app_cfg.server.environment,
            "Starting bootcamp service..."
        );

        let metrics = prometheus_handle();
        let db = open_database(&app_cfg, opts.auto_migrate).await?;
        let state = build_state(&app_cfg, db.clone());
        let repos = state.repos.clone();

        if opts.create_default_admin {
            let admin = &app_cfg.admin;
            match state
                .users
                .ensure_admin(&admin.name, &admin.email, &admin.password)
                .await
            {
                Ok(true) => {
                    info!("Default admin created: {}", admin.email);
                    info!("⚠️  Please change the admin password immediately!");
                }
                Ok(false) => {}
                Err(e) => error!("Failed to create admin user: {}", e),
            }
        }

        let router = create_api_router(
            state,
            RouterOptions {
                public_dir: Some(app_cfg.uploads.public_dir.clone()),
                metrics: Some(metrics),
            },
        );

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let listener = tokio::net::TcpListener::bind(app_cfg.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });
        info!("🚀 Server started.");

        Ok(Self {
            repos,
            config: app_cfg,
            api_port: local_addr.port(),
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop, then close the database.
    ///
    /// In-flight requests get `server.shutdown_timeout` seconds once the
    /// shutdown signal fires.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            mut api_task,
            ..
        } = self;

        let signal = shutdown.signal();
        let finished = tokio::select! {
            result = &mut api_task => Some(result),
            _ = signal.wait() => None,
        };
        let result = match finished {
            Some(result) => Some(result),
            None => {
                info!("⏳ Waiting for in-flight requests...");
                let mut joined = None;
                let drained = shutdown
                    .drain(async {
                        joined = Some((&mut api_task).await);
                    })
                    .await;
                if !drained {
                    api_task.abort();
                }
                joined
            }
        };
        if let Some(Err(e)) = result {
            error!("REST API server task panicked: {}", e);
        }
        info!("REST API server stopped");

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }
        info!("👋 Bootcamp service shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("🛑 Shutting down bootcamp service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the logging section; `RUST_LOG` wins over `level`.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_timeout = 2;
        config.database.url = "sqlite::memory:".to_string();
        config
    }

    #[tokio::test]
    async fn start_serves_health_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            ..ServerOptions::default()
        })
        .await
        .unwrap();
        assert!(handle.is_running());
        assert_eq!(handle.repos.users().count_users().await.unwrap(), 1);

        let url = format!("http://127.0.0.1:{}/health", handle.api_port);
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        handle.shutdown().await;
    }
}
