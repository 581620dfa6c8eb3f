use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;

mod achievements;
mod admin;
mod alumni;
mod analytics;
pub mod auth;
mod career;
mod error;
mod export;
pub mod gate;
mod observability;
mod testimonials;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(Arc::new(AppState {
        config: Arc::new(RwLock::new(config)),
        store,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_lifetime_minutes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = create_api_router().with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(gate::page_shell)
        .layer(middleware::from_fn(gate::access_gate))
        .layer(session_layer)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/alumni/me", get(alumni::get_profile))
        .route("/alumni/me", put(alumni::update_profile))
        .route("/alumni/network", get(alumni::network))
        .route("/alumni/careers", get(career::list_own))
        .route("/alumni/careers", post(career::create))
        .route("/alumni/achievements", get(achievements::list_own))
        .route("/alumni/achievements", post(achievements::create))
        .route("/dashboard/stats", get(alumni::dashboard_stats))
        .route("/testimonials", get(testimonials::list_approved))
        .route("/testimonials", post(testimonials::create))
        .route("/admin/alumni", get(admin::list_alumni))
        .route("/admin/alumni/{id}", get(admin::get_alumni))
        .route("/admin/alumni/{id}", delete(admin::delete_alumni))
        .route("/admin/alumni/{id}/verify", post(admin::verify_alumni))
        .route("/admin/careers", get(career::admin_list))
        .route("/admin/achievements", get(achievements::admin_list))
        .route("/admin/achievements/{id}", delete(achievements::admin_delete))
        .route("/admin/testimonials", get(testimonials::admin_list))
        .route(
            "/admin/testimonials/{id}",
            patch(testimonials::admin_moderate),
        )
        .route(
            "/admin/testimonials/{id}",
            delete(testimonials::admin_delete),
        )
        .route("/admin/broadcast", post(admin::broadcast))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/export", get(export::export))
        .route("/analytics", get(analytics::overview))
        .route("/analytics/distribution", get(analytics::distribution))
        .route("/health", get(observability::health))
        .route("/metrics", get(observability::get_metrics))
}
