#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the green cover dashboard.
//!
//! These are the JSON and query-string shapes of the dashboard's own HTTP
//! surface. Backend wire types live in `green_cover_sector_models::api`.

use green_cover_sector_models::SectorId;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Shown in place of a percentage that could not be fetched.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fallback error text when the backend gives no reason.
pub const LOOKUP_FAILED_MESSAGE: &str = "Failed to calculate green cover";

/// One of the three mutually exclusive dashboard panels.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DashboardTab {
    #[default]
    Map,
    Analytics,
    Critical,
}

impl DashboardTab {
    /// Tab caption.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Map => "Map View",
            Self::Analytics => "Analytics",
            Self::Critical => "Critical Zones",
        }
    }

    /// Returns all tabs in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Map, Self::Analytics, Self::Critical]
    }
}

/// Query parameters of the dashboard page. Kept as raw strings so that a
/// bad value degrades to the default view instead of a 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewParams {
    /// Selected sector in any accepted spelling.
    pub sector: Option<String>,
    /// Active tab.
    pub tab: Option<String>,
    /// Search box text.
    pub q: Option<String>,
}

/// Query parameters for the catalog endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Query parameters for the popup endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PopupParams {
    pub lng: f64,
    pub lat: f64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSector {
    /// Identifier form, e.g. `"Sector_5"`.
    pub id: String,
    /// Display form, e.g. `"Sector 5"`.
    pub name: String,
    pub number: u16,
}

impl From<SectorId> for ApiSector {
    fn from(sector: SectorId) -> Self {
        Self {
            id: sector.slug(),
            name: sector.display_name(),
            number: sector.number(),
        }
    }
}

/// Result of a single-sector green cover lookup.
///
/// `display` is the formatted percentage, or [`NOT_AVAILABLE`] with
/// `error` set when the lookup failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGreenCover {
    pub sector: SectorId,
    pub green_cover: Option<f64>,
    pub display: String,
    pub error: Option<String>,
}

impl ApiGreenCover {
    #[must_use]
    pub fn found(sector: SectorId, green_cover: f64) -> Self {
        Self {
            sector,
            green_cover: Some(green_cover),
            display: format!("{green_cover:.2}%"),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(sector: SectorId, error: Option<String>) -> Self {
        Self {
            sector,
            green_cover: None,
            display: NOT_AVAILABLE.to_string(),
            error: Some(
                error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| LOOKUP_FAILED_MESSAGE.to_string()),
            ),
        }
    }
}
