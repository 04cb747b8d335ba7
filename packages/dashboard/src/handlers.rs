//! HTTP handler functions for the dashboard.

use std::path::Path;

use actix_web::{HttpResponse, web};
use green_cover_analytics::{matches_query, summarize};
use green_cover_client::SectorApi;
use green_cover_dashboard_models::{
    ApiGreenCover, ApiHealth, ApiSector, PopupParams, SearchParams, ViewParams,
};
use green_cover_overlay::{LoadOutcome, legend};
use green_cover_sector_models::SectorId;
use include_dir::{Dir, include_dir};

use crate::AppState;
use crate::render::render_page;
use crate::shell::{DashboardPage, ViewState};

/// Page script and stylesheet.
static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// `GET /`
pub async fn index<A: SectorApi + 'static>(
    state: web::Data<AppState<A>>,
    params: web::Query<ViewParams>,
) -> HttpResponse {
    let view = ViewState::from_params(&params);
    let page = DashboardPage::compose(
        view,
        &state.overlay.stats(),
        &state.thresholds,
        state.overlay.projection(),
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&page, &state.map))
}

/// `GET /static/{file}`
pub async fn static_file(path: web::Path<String>) -> HttpResponse {
    let name = path.into_inner();
    let Some(file) = STATIC_DIR.get_file(&name) else {
        return not_found(&format!("No static file {name:?}"));
    };

    let content_type = match Path::new(&name).extension().and_then(|e| e.to_str()) {
        Some("js") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        _ => "application/octet-stream",
    };

    HttpResponse::Ok()
        .content_type(content_type)
        .body(file.contents())
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/sectors`
///
/// Lists the selectable sectors, filtered by the optional `q` search text.
pub async fn sectors(params: web::Query<SearchParams>) -> HttpResponse {
    let query = params.q.as_deref().unwrap_or_default();
    let sectors: Vec<ApiSector> = SectorId::all()
        .iter()
        .copied()
        .filter(|s| matches_query(*s, query))
        .map(ApiSector::from)
        .collect();

    HttpResponse::Ok().json(sectors)
}

/// `GET /api/green-cover/{sector}`
///
/// Looks up one sector on the backend. Failures answer with the `N/A`
/// sentinel and the backend's error message.
pub async fn green_cover<A: SectorApi + 'static>(
    state: web::Data<AppState<A>>,
    path: web::Path<String>,
) -> HttpResponse {
    let sector = match path.parse::<SectorId>() {
        Ok(sector) => sector,
        Err(e) => return bad_request(&e.to_string()),
    };

    match state.overlay.api().green_cover(sector).await {
        Ok(response) => {
            HttpResponse::Ok().json(ApiGreenCover::found(sector, response.green_cover.value()))
        }
        Err(e) => {
            log::error!("Failed to fetch green cover for {sector}: {e}");
            HttpResponse::BadGateway().json(ApiGreenCover::failed(sector, Some(e.user_message())))
        }
    }
}

/// `GET /api/overlay`
pub async fn overlay<A: SectorApi + 'static>(state: web::Data<AppState<A>>) -> HttpResponse {
    HttpResponse::Ok().json(state.overlay.projection())
}

/// `POST /api/map/ready`
///
/// The first call loads every sector and returns the outcome; later calls
/// return `null`.
pub async fn map_ready<A: SectorApi + 'static>(state: web::Data<AppState<A>>) -> HttpResponse {
    let outcome = state.overlay.map_ready().await;
    HttpResponse::Ok().json(outcome)
}

/// `POST /api/refresh`
pub async fn refresh<A: SectorApi + 'static>(state: web::Data<AppState<A>>) -> HttpResponse {
    let outcome = state.overlay.refresh().await;
    match outcome {
        LoadOutcome::Applied { .. } | LoadOutcome::Superseded { .. } => {
            HttpResponse::Ok().json(outcome)
        }
        LoadOutcome::Failed { .. } => HttpResponse::BadGateway().json(outcome),
        LoadOutcome::NotReady => HttpResponse::Conflict().json(outcome),
    }
}

/// `POST /api/select/{sector}`
pub async fn select<A: SectorApi + 'static>(
    state: web::Data<AppState<A>>,
    path: web::Path<String>,
) -> HttpResponse {
    match path.parse::<SectorId>() {
        Ok(sector) => HttpResponse::Ok().json(state.overlay.select(sector)),
        Err(e) => bad_request(&e.to_string()),
    }
}

/// `GET /api/popup?lng=&lat=`
pub async fn popup<A: SectorApi + 'static>(
    state: web::Data<AppState<A>>,
    params: web::Query<PopupParams>,
) -> HttpResponse {
    state.overlay.popup_at(params.lng, params.lat).map_or_else(
        || not_found("No sector at this location"),
        |popup| HttpResponse::Ok().json(popup),
    )
}

/// `GET /api/summary`
///
/// Analytics over the loaded stats, `null` before the first load.
pub async fn summary<A: SectorApi + 'static>(state: web::Data<AppState<A>>) -> HttpResponse {
    HttpResponse::Ok().json(summarize(&state.overlay.stats(), &state.thresholds))
}

/// `GET /api/legend`
pub async fn legend_entries() -> HttpResponse {
    HttpResponse::Ok().json(legend())
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": message }))
}
