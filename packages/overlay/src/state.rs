//! The overlay state machine.
//!
//! [`OverlayState`] is the single owner of everything the map shows. It is
//! only changed through its methods, and [`OverlayState::project`] renders
//! it into a [`MapProjection`] without side effects.

use chrono::{DateTime, TimeDelta, Utc};
use geojson::FeatureCollection;
use green_cover_client::ClientError;
use green_cover_sector_models::api::AllSectorsResponse;
use green_cover_sector_models::{SectorId, SectorRecord};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::bounds::{LngLatBounds, union_all};
use crate::features::{FeatureError, SectorFeature, parse_collection};
use crate::layers::{FIT_PADDING, FOCUS_DURATION_MS, FOCUS_PADDING, LayerSpec, SourceSpec};
use crate::palette::{LegendEntry, legend};
use crate::popup::SectorPopup;

pub const LOADING_MESSAGE: &str = "Fetching all sectors data...";
pub const LOAD_FAILED_MESSAGE: &str = "Error loading sectors data";
pub const REFRESH_FAILED_MESSAGE: &str = "Error clearing cached sectors data";
const LOAD_CANCELLED: &str = "Sectors load was cancelled";

const SUCCESS_MESSAGE_MS: i64 = 1_000;
const ERROR_MESSAGE_MS: i64 = 2_000;

/// Where the all-sectors load currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Success,
    Error,
}

/// A status line shown over the map. Messages with an expiry stop being
/// projected once it passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    pub text: String,
    pub level: MessageLevel,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Info,
            expires_at: None,
        }
    }

    fn success(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Success,
            expires_at: Some(now + TimeDelta::milliseconds(SUCCESS_MESSAGE_MS)),
        }
    }

    fn error(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Error,
            expires_at: Some(now + TimeDelta::milliseconds(ERROR_MESSAGE_MS)),
        }
    }

    /// Whether the message is still shown at `now`.
    #[must_use]
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires| now < expires)
    }
}

/// A requested viewport move.
///
/// `revision` increases with every request so a renderer can apply each
/// move exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraTarget {
    pub bounds: LngLatBounds,
    pub padding: u32,
    /// Animation length, `None` to jump.
    pub duration_ms: Option<u32>,
    pub revision: u64,
}

/// Data from the latest applied load.
#[derive(Debug, Clone)]
pub struct InstalledOverlay {
    pub token: u64,
    pub collection: FeatureCollection,
    pub features: Vec<SectorFeature>,
    /// Union of every feature's bounds, `None` for an empty collection.
    pub bounds: Option<LngLatBounds>,
    pub stats: Vec<SectorRecord>,
    pub failed_sectors: Vec<SectorId>,
    pub success_rate: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

/// Result of one load attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The response was installed.
    Applied { sectors: usize },
    /// The load failed; the previous overlay, if any, is still installed.
    Failed { message: String },
    /// A newer load started before this one finished; its result was
    /// dropped.
    Superseded { token: u64, latest: u64 },
    /// The map has not signalled ready yet.
    NotReady,
}

/// Result of selecting a sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// The camera now targets the sector.
    Focused { camera: CameraTarget },
    /// No installed feature is named after the sector. The camera is
    /// unchanged.
    Missed,
    /// Nothing is installed yet.
    NotReady,
}

/// Everything the map shows, as data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapProjection {
    pub map_ready: bool,
    pub status: LoadStatus,
    pub source: Option<SourceSpec>,
    pub layers: Vec<LayerSpec>,
    pub camera: Option<CameraTarget>,
    /// Fit-all view of the installed overlay at the current camera
    /// revision. A page opened without a selection starts here.
    pub overview: Option<CameraTarget>,
    pub legend: Vec<LegendEntry>,
    pub message: Option<StatusMessage>,
    pub error: Option<String>,
    pub sector_count: usize,
    pub failed_sectors: Vec<SectorId>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    map_ready: bool,
    latest_token: u64,
    loading: bool,
    last_error: Option<String>,
    overlay: Option<InstalledOverlay>,
    camera: Option<CameraTarget>,
    camera_revision: u64,
    message: Option<StatusMessage>,
}

impl OverlayState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the map ready signal. Returns `true` only the first time.
    pub const fn mark_ready(&mut self) -> bool {
        let first = !self.map_ready;
        self.map_ready = true;
        first
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.map_ready
    }

    #[must_use]
    pub const fn latest_token(&self) -> u64 {
        self.latest_token
    }

    #[must_use]
    pub const fn overlay(&self) -> Option<&InstalledOverlay> {
        self.overlay.as_ref()
    }

    #[must_use]
    pub const fn camera(&self) -> Option<&CameraTarget> {
        self.camera.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> LoadStatus {
        if self.loading {
            LoadStatus::Loading
        } else if self.last_error.is_some() {
            LoadStatus::Failed
        } else if self.overlay.is_some() {
            LoadStatus::Loaded
        } else {
            LoadStatus::Idle
        }
    }

    /// Starts a load attempt and returns its token. Every earlier token
    /// becomes stale.
    pub fn begin_load(&mut self) -> u64 {
        self.latest_token += 1;
        self.loading = true;
        self.message = Some(StatusMessage::info(LOADING_MESSAGE));
        log::debug!("Starting sectors load {}", self.latest_token);
        self.latest_token
    }

    /// Applies the completion of load `token`.
    ///
    /// Stale tokens leave the state untouched. A failed fetch or an
    /// invalid feature collection keeps the previous overlay installed.
    pub fn complete_load(
        &mut self,
        token: u64,
        result: Result<AllSectorsResponse, ClientError>,
        now: DateTime<Utc>,
    ) -> LoadOutcome {
        if token != self.latest_token {
            log::warn!(
                "Discarding stale sectors load {token} (latest is {})",
                self.latest_token
            );
            return LoadOutcome::Superseded {
                token,
                latest: self.latest_token,
            };
        }

        let installed = result
            .map_err(|e| e.user_message())
            .and_then(|response| {
                self.install(token, response, now)
                    .map_err(|e: FeatureError| e.to_string())
            });

        match installed {
            Ok(sectors) => LoadOutcome::Applied { sectors },
            Err(message) => {
                log::error!("Sectors load {token} failed: {message}");
                self.fail(message.clone(), now);
                LoadOutcome::Failed { message }
            }
        }
    }

    fn install(
        &mut self,
        token: u64,
        response: AllSectorsResponse,
        now: DateTime<Utc>,
    ) -> Result<usize, FeatureError> {
        let features = parse_collection(&response.geojson)?;
        let bounds = union_all(features.iter().map(|f| f.bounds));
        let count = response.total_sectors;

        if let Some(bounds) = bounds {
            self.set_camera(bounds, FIT_PADDING, None);
        }

        self.overlay = Some(InstalledOverlay {
            token,
            collection: response.geojson,
            features,
            bounds,
            stats: response.sector_stats,
            failed_sectors: response.failed_sectors,
            success_rate: response.success_rate,
            loaded_at: now,
        });
        self.loading = false;
        self.last_error = None;
        self.message = Some(StatusMessage::success(
            format!("Loaded {count} sectors successfully"),
            now,
        ));
        log::info!(
            "Installed {count} sectors ({} features) from load {token}",
            self.overlay.as_ref().map_or(0, |o| o.features.len())
        );

        Ok(count)
    }

    fn fail(&mut self, detail: String, now: DateTime<Utc>) {
        self.loading = false;
        self.last_error = Some(detail);
        self.message = Some(StatusMessage::error(LOAD_FAILED_MESSAGE, now));
    }

    /// Records that load `token` was dropped before completing. Clears the
    /// loading status if it is still the newest load; the installed overlay
    /// stays.
    pub fn abandon_load(&mut self, token: u64, now: DateTime<Utc>) {
        if token != self.latest_token || !self.loading {
            return;
        }
        log::warn!("Sectors load {token} dropped before completing");
        self.fail(LOAD_CANCELLED.to_string(), now);
    }

    /// Records a failed cache invalidation. No load is started, so the
    /// installed overlay and load status are unchanged.
    pub fn refresh_failed(&mut self, error: &ClientError, now: DateTime<Utc>) {
        self.message = Some(StatusMessage::error(
            format!("{REFRESH_FAILED_MESSAGE}: {}", error.user_message()),
            now,
        ));
    }

    /// Points the camera at `sector` if an installed feature carries its
    /// name.
    pub fn focus(&mut self, sector: SectorId) -> SelectionOutcome {
        let bounds = match (&self.overlay, self.map_ready) {
            (Some(overlay), true) => overlay
                .features
                .iter()
                .find(|f| f.sector == Some(sector))
                .map(|f| f.bounds),
            _ => return SelectionOutcome::NotReady,
        };

        match bounds {
            Some(bounds) => SelectionOutcome::Focused {
                camera: self.set_camera(bounds, FOCUS_PADDING, Some(FOCUS_DURATION_MS)),
            },
            None => {
                log::warn!("{sector} not found in loaded features");
                SelectionOutcome::Missed
            }
        }
    }

    fn set_camera(&mut self, bounds: LngLatBounds, padding: u32, duration_ms: Option<u32>) -> CameraTarget {
        self.camera_revision += 1;
        let camera = CameraTarget {
            bounds,
            padding,
            duration_ms,
            revision: self.camera_revision,
        };
        self.camera = Some(camera);
        camera
    }

    /// Popup for the topmost feature under `(lng, lat)`.
    #[must_use]
    pub fn popup_at(&self, lng: f64, lat: f64) -> Option<SectorPopup> {
        self.overlay
            .as_ref()?
            .features
            .iter()
            .rev()
            .find(|f| f.contains(lng, lat))
            .map(|f| SectorPopup::new(f, lng, lat))
    }

    /// Per-sector records of the installed overlay, empty before the first
    /// successful load.
    #[must_use]
    pub fn stats(&self) -> Vec<SectorRecord> {
        self.overlay
            .as_ref()
            .map(|o| o.stats.clone())
            .unwrap_or_default()
    }

    /// Renders the state as of `now`.
    #[must_use]
    pub fn project(&self, now: DateTime<Utc>) -> MapProjection {
        let overlay = self.overlay.as_ref();

        MapProjection {
            map_ready: self.map_ready,
            status: self.status(),
            source: overlay.map(|o| SourceSpec::sectors(o.collection.clone())),
            layers: overlay
                .map(|_| LayerSpec::sector_layers())
                .unwrap_or_default(),
            camera: self.camera,
            overview: overlay.and_then(|o| o.bounds).map(|bounds| CameraTarget {
                bounds,
                padding: FIT_PADDING,
                duration_ms: None,
                revision: self.camera_revision,
            }),
            legend: legend(),
            message: self.message.clone().filter(|m| m.is_visible(now)),
            error: self.last_error.clone(),
            sector_count: overlay.map_or(0, |o| o.features.len()),
            failed_sectors: overlay
                .map(|o| o.failed_sectors.clone())
                .unwrap_or_default(),
            loaded_at: overlay.map(|o| o.loaded_at),
        }
    }
}
