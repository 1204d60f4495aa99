//! Documentation of the terminal backend.
//!
//!
//!
//! # General Infrastructure
//! - Browser terminal talks to the public instance, which mostly forwards through `/proxy`
//! - `/proxy` targets the internal instance and injects the shared `x-api-key`
//! - Internal instance checks the key on every non-proxy route
//! - Two Redis instances: one for eligibility/registrations, one for prices
//! - Roster files live next to the binary and are batch-loaded by the `process` crate
//!
//!
//!
//! # Notes
//!
//! ## Redis
//! All persistence is plain keys holding JSON. Clawback registration is
//! the one write that races, so it goes through a compare-and-swap script
//! and the global "registered at most once" rule holds even when handlers
//! run on separate machines. Everything else is wholesale overwrites by
//! the batch loader or read-only scans.
//!
//! The registration record is a single aggregate key on purpose: the
//! uniqueness check spans all communities, and a check spanning several
//! independently-written keys could not be made atomic.
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    middleware::from_fn_with_state,
    routing::{any, get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod error;
pub mod prices;
pub mod proxy;
pub mod routes;
pub mod state;

use auth::require_api_key;
use proxy::proxy_handler;
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-api-key")])
        .max_age(Duration::from_secs(60 * 60));

    let eligible = Router::new()
        .route(
            "/get-address-communities",
            get(routes::get_address_communities),
        )
        .route(
            "/get-eligible-addresses",
            get(routes::get_eligible_addresses),
        )
        .route(
            "/set-address-communities",
            post(routes::set_address_communities),
        );

    let registration = Router::new()
        .route(
            "/get-clawback-registration",
            get(routes::get_clawback_registration),
        )
        .route(
            "/set-clawback-registration",
            post(routes::set_clawback_registration),
        )
        .route("/clawback-registration", post(routes::clawback_registration))
        .route("/list-all-communities", get(routes::list_all_communities));

    let prices = Router::new()
        .route("/get-price", get(routes::get_price))
        .route("/set-price", post(routes::set_price))
        .route("/get-price-history", get(routes::get_price_history));

    let app = Router::new()
        .nest("/eligible", eligible)
        .nest("/registration", registration)
        .nest("/prices", prices)
        .layer(from_fn_with_state(state.clone(), require_api_key))
        .route("/proxy/{*path}", any(proxy_handler))
        .fallback(routes::unknown_route)
        .method_not_allowed_fallback(routes::wrong_method)
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
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
