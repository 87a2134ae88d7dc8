//! Server wiring: storage, services, router and process lifecycle.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use bandobast_core::alerts::{AlertService, AlertServiceTrait};
use bandobast_core::auth::{AuthService, AuthServiceTrait};
use bandobast_core::duties::{DutyService, DutyServiceTrait};
use bandobast_core::events::Broadcaster;
use bandobast_core::maintenance::{MaintenanceService, MaintenanceServiceTrait};
use bandobast_core::notifications::{NotificationService, NotificationServiceTrait};
use bandobast_core::stats::{StatsService, StatsServiceTrait};
use bandobast_storage_sqlite::alerts::PanicAlertRepository;
use bandobast_storage_sqlite::duties::DutyRepository;
use bandobast_storage_sqlite::notifications::NotificationRepository;
use bandobast_storage_sqlite::officers::OfficerRepository;

use crate::api;
use crate::config::ServerConfig;
use crate::events::EventBus;

/// Shared handles behind every request handler.
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub duty_service: Arc<dyn DutyServiceTrait>,
    pub alert_service: Arc<dyn AlertServiceTrait>,
    pub notification_service: Arc<dyn NotificationServiceTrait>,
    pub stats_service: Arc<dyn StatsServiceTrait>,
    pub maintenance_service: Arc<dyn MaintenanceServiceTrait>,
    pub event_bus: EventBus,
    pub config: ServerConfig,
}

impl AppState {
    /// Open (and migrate) the database under `config.data_dir`, then
    /// wire repositories and services together.
    pub fn build(config: ServerConfig) -> anyhow::Result<Arc<AppState>> {
        let db_path = bandobast_storage_sqlite::init(&config.data_dir)
            .context("failed to prepare the data directory")?;
        bandobast_storage_sqlite::run_migrations(&db_path)
            .context("failed to run database migrations")?;
        let pool = bandobast_storage_sqlite::create_pool(&db_path)
            .context("failed to open the connection pool")?;
        let writer = bandobast_storage_sqlite::spawn_writer(pool.as_ref().clone());

        let officer_repository = Arc::new(OfficerRepository::new(pool.clone(), writer.clone()));
        let duty_repository = Arc::new(DutyRepository::new(pool.clone(), writer.clone()));
        let alert_repository = Arc::new(PanicAlertRepository::new(pool.clone(), writer.clone()));
        let notification_repository = Arc::new(NotificationRepository::new(pool, writer));

        let event_bus = EventBus::new(config.event_capacity);
        let broadcaster: Arc<dyn Broadcaster> = Arc::new(event_bus.clone());

        let notification_service = Arc::new(
            NotificationService::new(notification_repository.clone(), officer_repository.clone())
                .with_broadcaster(broadcaster.clone()),
        );
        let duty_service = Arc::new(
            DutyService::new(
                duty_repository.clone(),
                officer_repository.clone(),
                notification_service.clone(),
            )
            .with_broadcaster(broadcaster.clone())
            .with_geofence(config.geofence()),
        );
        let alert_service = Arc::new(
            AlertService::new(
                alert_repository.clone(),
                officer_repository.clone(),
                duty_repository.clone(),
            )
            .with_broadcaster(broadcaster),
        );
        let auth_service = Arc::new(AuthService::new(officer_repository.clone()));
        let stats_service = Arc::new(StatsService::new(
            duty_repository.clone(),
            officer_repository.clone(),
        ));
        let maintenance_service = Arc::new(MaintenanceService::new(
            officer_repository,
            duty_repository,
            alert_repository,
            notification_repository,
        ));

        Ok(Arc::new(AppState {
            auth_service,
            duty_service,
            alert_service,
            notification_service,
            stats_service,
            maintenance_service,
            event_bus,
            config,
        }))
    }
}

/// The full application router, CORS and tracing included.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .nest("/api", api::router(state.config.enable_debug_routes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// The dashboards are served from a separate origin, so the API stays
/// permissive unless an exact origin is configured.
fn cors_layer(origin: &str) -> CorsLayer {
    match origin {
        "" | "*" => CorsLayer::permissive(),
        origin => match origin.parse::<HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_origin(value),
            Err(err) => {
                warn!("Invalid CORS origin {origin:?} ({err}), falling back to permissive");
                CorsLayer::permissive()
            }
        },
    }
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load();
    info!(
        "Starting bandobast server (data dir: {}, debug routes: {})",
        config.data_dir, config.enable_debug_routes
    );

    let state = AppState::build(config)?;
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
