//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, locale)
//! - Serve pre-rendered pages behind locale routing
//! - Start the in-memory sweeper and stop it on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRef, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::contact::{autosave_form, submit_contact};
use crate::http::quote::create_quote;
use crate::lifecycle::Shutdown;
use crate::locale::{locale_middleware, switch_locale, LocaleState};
use crate::notify::ContactNotifier;
use crate::observability::metrics;
use crate::security::RateLimiter;
use crate::store::{KvStore, MemoryStore, Stores};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub records: Option<Arc<dyn KvStore>>,
    pub notifier: Option<ContactNotifier>,
    pub locale: LocaleState,
    pub memory: Arc<MemoryStore>,
}

impl AppState {
    pub fn new(stores: Stores, notifier: Option<ContactNotifier>, locale: LocaleState) -> Self {
        let limiter = RateLimiter::new("contact", stores.counters, stores.memory.clone());
        Self {
            limiter: Arc::new(limiter),
            records: stores.records,
            notifier,
            locale,
            memory: stores.memory,
        }
    }

    /// Select backends from configuration. Optional dependencies that are
    /// missing or unusable are skipped.
    pub fn from_config(config: &SiteConfig) -> Self {
        let outbound = Duration::from_secs(config.timeouts.outbound_secs);
        Self::new(
            Stores::from_config(&config.store, outbound),
            ContactNotifier::from_config(&config.email, outbound),
            LocaleState::from_config(&config.locale),
        )
    }
}

impl FromRef<AppState> for LocaleState {
    fn from_ref(state: &AppState) -> Self {
        state.locale.clone()
    }
}

/// HTTP server for the site.
pub struct SiteServer {
    router: Router,
    config: SiteConfig,
    state: AppState,
}

impl SiteServer {
    /// Create a new server with the given configuration.
    pub fn new(config: SiteConfig) -> Self {
        let state = AppState::from_config(&config);
        Self::with_state(config, state)
    }

    /// Create a server around prepared state.
    pub fn with_state(config: SiteConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SiteConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/contact", post(submit_contact))
            .route("/api/form-autosave", post(autosave_form))
            .route("/api/quote", post(create_quote))
            .route("/api/locale/{code}", get(switch_locale))
            .fallback_service(ServeDir::new(&config.pages.root))
            .layer(middleware::from_fn_with_state(
                state.locale.clone(),
                locale_middleware,
            ))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for driving without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            store = self.state.limiter.backend().as_str(),
            email = self.state.notifier.is_some(),
            pages = %self.config.pages.root,
            "HTTP server starting"
        );

        let sweeper = self.state.memory.clone().spawn_sweeper(
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
            shutdown.subscribe(),
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let mut stop = shutdown.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        let _ = sweeper.await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: state.limiter.backend().as_str(),
    })
}
