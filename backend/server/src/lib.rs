//! Documentation of the Sightline demo backend.
//!
//! A walking-assistant mock: the frontend uploads a clip or polls a simulated
//! live feed and reads the returned description aloud. Every answer comes from
//! a fixed table in the `model` crate, nothing is analysed or stored.
//!
//!
//!
//! # Endpoints
//!
//! ## `POST /api/video-analysis`
//! - `multipart/form-data` with a `video` file part: upload analysis, only the filename is used
//! - JSON `{"live": true, "tick": n}` sent as `application/json`: live scene for `n mod 5`
//! - Anything else: empty analysis with a hint
//! - Always `200` unless the multipart body is broken (`400`) or over `MAX_UPLOAD_BYTES` (`413`)
//!
//! Response
//! ```json
//! {
//!   "detected_objects": [{"name": "door", "confidence": 0.92, "warning_flag": false}],
//!   "audioDescription": "Door detected. Curb 3 feet ahead, watch your step.",
//!   "meta": {"processing_time_ms": 603, "source": "live", "filename": null, "timestamp": "...Z"}
//! }
//! ```
//!
//! ## `POST /contact`
//! - JSON `{name, email, message}`, non-string fields are taken as their JSON text
//! - `200 {"status": "success", "info": ...}` or `400 {"status": "error", "info": ...}`
//!
//! ## `GET /`, `GET /static/*`
//! - Single page app from `TEMPLATE_DIR/index.html` and `STATIC_DIR`
//!
//!
//!
//! # Filenames
//!
//! Upload names are untrusted. They are flattened to `[A-Za-z0-9_.-]` before
//! they reach the model or the logs and are never used as a path.
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! RUST_LOG=info cargo run -p sightline
//! ```
//!
//! Skip the simulated latency.
//! ```sh
//! ANALYSIS_DELAY_MS=0 CONTACT_DELAY_MS=0 cargo run -p sightline
//! ```
//!
//! Log full analysis payloads.
//! ```sh
//! RUST_LOG=server=debug cargo run -p sightline --features server/verbose
//! ```
//!
//! Walk the live feed from another terminal.
//! ```sh
//! cargo run -p tester -- --ticks 10
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use routes::{contact_handler, video_analysis_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let index = ServeFile::new(state.config.template_dir.join("index.html"));
    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route_service("/", index)
        .nest_service("/static", assets)
        .route(
            "/api/video-analysis",
            post(video_analysis_handler)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/contact", post(contact_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config);

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
