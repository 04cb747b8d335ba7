//! Wire types for the green cover backend REST API.
//!
//! These mirror the JSON bodies of `/api/all-sectors`,
//! `/api/green-cover/{sector}` and `/api/clear-cache`. Optional fields are ones older backend builds omit.

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::{GreenCover, SectorId, SectorRecord};

/// Body of `GET /api/all-sectors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllSectorsResponse {
    /// Number of sectors the backend computed successfully.
    pub total_sectors: usize,
    /// One record per computed sector.
    pub sector_stats: Vec<SectorRecord>,
    /// Boundaries of every computed sector, with `name` and `green_cover`
    /// feature properties.
    pub geojson: FeatureCollection,
    /// Sectors the backend could not compute.
    #[serde(default)]
    pub failed_sectors: Vec<SectorId>,
    /// Human-readable `"computed/requested"` ratio.
    #[serde(default)]
    pub success_rate: Option<String>,
}

/// Body of a successful `GET /api/green-cover/{sector}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenCoverResponse {
    /// Sector name echoed back by the backend.
    #[serde(default)]
    pub sector: Option<SectorId>,
    /// Green cover percentage.
    pub green_cover: GreenCover,
    /// Bounding box used for the computation as
    /// `[min_lon, min_lat, max_lon, max_lat]`.
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
}

/// Body of `GET /api/clear-cache`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    /// Confirmation message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
