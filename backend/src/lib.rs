//! # Makerspace Check-in Backend
//!
//! Visitor registration, check-in/check-out, post-visit feedback and the
//! admin dashboard for a community makerspace.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (services, business rules, calculators)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! The SQLite pool and the site clock are created once at startup and passed
//! to every service through [`AppState`].

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::domain::{
    ExportService, FeedbackService, ReportService, SiteClock, UserService, VisitService,
};
use crate::storage::DbConnection;

pub use domain::{calculate_age, calculate_duration_hours};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService<DbConnection>,
    pub visit_service: VisitService<DbConnection>,
    pub feedback_service: FeedbackService<DbConnection>,
    pub report_service: ReportService<DbConnection>,
    pub export_service: ExportService<DbConnection>,
    pub clock: SiteClock,
    pub db: DbConnection,
}

impl AppState {
    pub fn new(db: DbConnection, clock: SiteClock, config: &AppConfig) -> Self {
        let connection = Arc::new(db.clone());
        let report_service =
            ReportService::new(connection.clone(), clock.clone(), config.report_default_days);

        Self {
            user_service: UserService::new(
                connection.clone(),
                clock.clone(),
                config.min_registration_age,
            ),
            visit_service: VisitService::new(connection.clone(), clock.clone()),
            feedback_service: FeedbackService::new(connection, clock.clone()),
            export_service: ExportService::new(report_service.clone()),
            report_service,
            clock,
            db,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    let clock = config.site_clock()?;
    info!("Site clock running at UTC{}", clock.offset());

    Ok(AppState::new(db, clock, config))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(io::health))
        .route("/clock", get(io::get_clock))
        .route("/stats", get(io::get_stats))
        .route("/facilities", get(io::list_facilities))
        .route("/users", get(io::list_users).post(io::register_user))
        .route("/users/search", get(io::search_users))
        .route(
            "/users/:id",
            get(io::get_user).put(io::update_user).delete(io::delete_user),
        )
        .route("/visits/check-in", post(io::check_in))
        .route("/visits/active", get(io::list_active_visits))
        .route("/visits/:id/check-out", post(io::check_out))
        .route("/visits/:id/feedback", post(io::submit_feedback))
        .route("/reports/dashboard", get(io::get_dashboard))
        .route("/reports/export.csv", get(io::export_csv));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
