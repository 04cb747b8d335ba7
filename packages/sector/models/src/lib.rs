#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sector catalog and per-sector green cover records.
//!
//! This crate defines the canonical sector identifier used across the
//! entire green-cover system. Every place a sector name crosses a boundary
//! (catalog, backend URLs, `GeoJSON` feature names, query strings, display)
//! goes through [`SectorId`]'s [`FromStr`] implementation, so `"Sector_5"`,
//! `"Sector 5"`, `"sector-5"` and `"5"` all resolve to the same sector.

pub mod api;

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest sector number in the catalog.
pub const MAX_SECTOR: u16 = 56;

/// Sector number that does not exist in the city plan.
pub const SKIPPED_SECTOR: u16 = 13;

/// Number of selectable sectors (`1..=56` minus the skipped number).
pub const CATALOG_LEN: usize = 55;

static CATALOG: [SectorId; CATALOG_LEN] = build_catalog();

/// Accepts an optional `sector` prefix, any run of separators, and the
/// sector number. Leading zeros are ignored.
static SECTOR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:sector)?[\s_.\-]*0*(\d{1,4})\s*$").expect("valid regex")
});

const fn build_catalog() -> [SectorId; CATALOG_LEN] {
    let mut out = [SectorId(1); CATALOG_LEN];
    let mut number = 1;
    let mut idx = 0;
    while number <= MAX_SECTOR {
        if number != SKIPPED_SECTOR {
            out[idx] = SectorId(number);
            idx += 1;
        }
        number += 1;
    }
    out
}

/// Error returned when a string or number does not identify a sector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sector identifier {input:?}")]
pub struct InvalidSectorError {
    /// The rejected input.
    pub input: String,
}

/// Error returned when a green cover value is outside `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid green cover {value}: expected a finite percentage in 0-100")]
pub struct InvalidGreenCoverError {
    /// The rejected value.
    pub value: f64,
}

/// A numbered city sector.
///
/// Serializes as its display name (`"Sector 5"`), which is also the form the
/// backend expects in request paths and emits in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectorId(u16);

impl SectorId {
    /// Creates a sector identifier from its number.
    ///
    /// Numbers outside the catalog (e.g. the skipped sector) are accepted so
    /// that backend data naming them still decodes; use
    /// [`Self::is_cataloged`] to check selectability.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSectorError`] if `number` is zero.
    pub fn new(number: u16) -> Result<Self, InvalidSectorError> {
        if number == 0 {
            return Err(InvalidSectorError {
                input: number.to_string(),
            });
        }
        Ok(Self(number))
    }

    /// Returns the sector number.
    #[must_use]
    pub const fn number(self) -> u16 {
        self.0
    }

    /// Whether this sector is part of the selectable catalog.
    #[must_use]
    pub const fn is_cataloged(self) -> bool {
        self.0 >= 1 && self.0 <= MAX_SECTOR && self.0 != SKIPPED_SECTOR
    }

    /// Catalog identifier form, e.g. `"Sector_5"`.
    #[must_use]
    pub fn slug(self) -> String {
        format!("Sector_{}", self.0)
    }

    /// Display and backend form, e.g. `"Sector 5"`.
    #[must_use]
    pub fn display_name(self) -> String {
        self.to_string()
    }

    /// Returns every selectable sector in ascending order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &CATALOG
    }
}

impl std::fmt::Display for SectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sector {}", self.0)
    }
}

impl FromStr for SectorId {
    type Err = InvalidSectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSectorError {
            input: s.to_string(),
        };

        let caps = SECTOR_NAME_RE.captures(s).ok_or_else(invalid)?;
        let number: u16 = caps[1].parse().map_err(|_| invalid())?;

        Self::new(number).map_err(|_| invalid())
    }
}

impl TryFrom<String> for SectorId {
    type Error = InvalidSectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SectorId> for String {
    fn from(value: SectorId) -> Self {
        value.display_name()
    }
}

/// A green cover percentage, validated to be finite and within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct GreenCover(f64);

impl GreenCover {
    /// Creates a validated percentage.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidGreenCoverError`] if `value` is NaN, infinite, or
    /// outside `0..=100`.
    pub fn new(value: f64) -> Result<Self, InvalidGreenCoverError> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidGreenCoverError { value })
        }
    }

    /// Returns the raw percentage.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for GreenCover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for GreenCover {
    type Error = InvalidGreenCoverError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GreenCover> for f64 {
    fn from(value: GreenCover) -> Self {
        value.0
    }
}

/// Green cover statistics for one sector, as produced by the backend.
///
/// Both fields are required; a record without `green_cover` fails to
/// decode rather than defaulting to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorRecord {
    /// The sector this record describes.
    pub sector: SectorId,
    /// Percentage of the sector's area classified as vegetation.
    pub green_cover: GreenCover,
}

impl SectorRecord {
    /// Creates a record from already-validated parts.
    #[must_use]
    pub const fn new(sector: SectorId, green_cover: GreenCover) -> Self {
        Self {
            sector,
            green_cover,
        }
    }

    /// Returns the raw green cover percentage.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.green_cover.value()
    }
}
