#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web dashboard server for sector green cover.
//!
//! Renders the dashboard page server-side and serves the map overlay as
//! JSON. The page script only forwards map events (ready, click, refresh,
//! selection) and applies the overlay projection it gets back; all state
//! lives in the [`OverlayController`] held by [`AppState`].

pub mod config;
mod handlers;
pub mod interactive;
pub mod render;
pub mod shell;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use green_cover_analytics_models::ZoneThresholds;
use green_cover_client::{ClientError, SectorApi, SectorClient};
use green_cover_overlay::OverlayController;
use thiserror::Error;

use crate::config::{ConfigError, DashboardConfig, MapSettings};

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The backend client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Binding or serving failed.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState<A> {
    /// Overlay state and the backend it loads from.
    pub overlay: OverlayController<A>,
    /// Zone boundaries for the analytics panels.
    pub thresholds: ZoneThresholds,
    /// Map widget settings passed to the page.
    pub map: MapSettings,
}

impl<A: SectorApi> AppState<A> {
    #[must_use]
    pub fn new(api: A, thresholds: ZoneThresholds, map: MapSettings) -> Self {
        Self {
            overlay: OverlayController::new(api),
            thresholds,
            map,
        }
    }
}

/// Registers every dashboard route for a backend of type `A`.
pub fn configure<A: SectorApi + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index::<A>))
        .route("/static/{file}", web::get().to(handlers::static_file))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/sectors", web::get().to(handlers::sectors))
                .route("/green-cover/{sector}", web::get().to(handlers::green_cover::<A>))
                .route("/overlay", web::get().to(handlers::overlay::<A>))
                .route("/map/ready", web::post().to(handlers::map_ready::<A>))
                .route("/refresh", web::post().to(handlers::refresh::<A>))
                .route("/select/{sector}", web::post().to(handlers::select::<A>))
                .route("/popup", web::get().to(handlers::popup::<A>))
                .route("/summary", web::get().to(handlers::summary::<A>))
                .route("/legend", web::get().to(handlers::legend_entries)),
        );
}

/// Starts the dashboard server.
///
/// Builds the backend client from `config` and serves until shut down.
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the thresholds or backend URL are invalid, or
/// if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: DashboardConfig) -> Result<(), ServerError> {
    let thresholds = config.zone_thresholds()?;
    let client = SectorClient::new(&config.backend_url, config.request_timeout())?;
    log::info!("Using green cover backend at {}", client.base_url());

    let state = web::Data::new(AppState::new(client, thresholds, config.map.clone()));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure::<SectorClient>)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
