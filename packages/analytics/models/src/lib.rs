#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics summary types for sector green cover.
//!
//! Defines the zone classification (critical / moderate / good), the
//! thresholds that drive it, and the [`AnalyticsSummary`] derived from a
//! list of [`SectorRecord`]s.

use green_cover_sector_models::SectorRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Default upper bound (exclusive) of the critical zone.
pub const DEFAULT_CRITICAL_BELOW: f64 = 43.5;

/// Default lower bound (inclusive) of the good zone.
pub const DEFAULT_GOOD_FROM: f64 = 52.0;

/// Number of sectors shown in the top and bottom performer lists.
pub const PERFORMER_COUNT: usize = 5;

/// Zone classification of a sector by its green cover.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ZoneCategory {
    /// Below the critical threshold.
    Critical,
    /// Between the critical and good thresholds.
    Moderate,
    /// At or above the good threshold.
    Good,
}

impl ZoneCategory {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
        }
    }

    /// Chart color for this category.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Critical => "#DC2626",
            Self::Moderate => "#F59E0B",
            Self::Good => "#16A34A",
        }
    }

    /// Returns all variants of this enum, worst first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Critical, Self::Moderate, Self::Good]
    }
}

/// Error returned when zone thresholds are out of order or out of range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "invalid zone thresholds: critical below {critical_below}, good from {good_from} \
     (expected 0 <= critical <= good <= 100)"
)]
pub struct InvalidThresholdsError {
    /// Requested critical bound.
    pub critical_below: f64,
    /// Requested good bound.
    pub good_from: f64,
}

/// Boundaries between zone categories.
///
/// Lower bounds are inclusive and upper bounds exclusive: a value exactly at
/// `critical_below` is moderate, a value exactly at `good_from` is good.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ThresholdValues")]
pub struct ZoneThresholds {
    critical_below: f64,
    good_from: f64,
}

/// Unvalidated threshold pair, as found in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdValues {
    /// Upper bound (exclusive) of the critical zone.
    pub critical_below: f64,
    /// Lower bound (inclusive) of the good zone.
    pub good_from: f64,
}

impl TryFrom<ThresholdValues> for ZoneThresholds {
    type Error = InvalidThresholdsError;

    fn try_from(value: ThresholdValues) -> Result<Self, Self::Error> {
        Self::new(value.critical_below, value.good_from)
    }
}

impl ZoneThresholds {
    /// Creates validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidThresholdsError`] unless
    /// `0 <= critical_below <= good_from <= 100`.
    pub fn new(critical_below: f64, good_from: f64) -> Result<Self, InvalidThresholdsError> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if in_range(critical_below) && in_range(good_from) && critical_below <= good_from {
            Ok(Self {
                critical_below,
                good_from,
            })
        } else {
            Err(InvalidThresholdsError {
                critical_below,
                good_from,
            })
        }
    }

    /// Upper bound (exclusive) of the critical zone.
    #[must_use]
    pub const fn critical_below(&self) -> f64 {
        self.critical_below
    }

    /// Lower bound (inclusive) of the good zone.
    #[must_use]
    pub const fn good_from(&self) -> f64 {
        self.good_from
    }

    /// Classifies a green cover percentage.
    #[must_use]
    pub fn classify(&self, green_cover: f64) -> ZoneCategory {
        if green_cover < self.critical_below {
            ZoneCategory::Critical
        } else if green_cover < self.good_from {
            ZoneCategory::Moderate
        } else {
            ZoneCategory::Good
        }
    }
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            critical_below: DEFAULT_CRITICAL_BELOW,
            good_from: DEFAULT_GOOD_FROM,
        }
    }
}

/// Count of sectors in one zone category, for charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    /// Zone category.
    pub category: ZoneCategory,
    /// Number of sectors in the category.
    pub count: usize,
    /// Share of all sectors, in percent, rounded to one decimal.
    pub share: f64,
}

/// Summary analytics over a non-empty list of sector records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Number of records.
    pub total: usize,
    /// Arithmetic mean of all green cover values, full precision.
    pub mean: f64,
    /// [`Self::mean`] rounded to one decimal, for display.
    pub average: f64,
    /// Record with the highest green cover (first occurrence on ties).
    pub highest: SectorRecord,
    /// Record with the lowest green cover.
    pub lowest: SectorRecord,
    /// Records below the critical threshold, in input order.
    pub critical_zones: Vec<SectorRecord>,
    /// Records between the thresholds, in input order.
    pub moderate_zones: Vec<SectorRecord>,
    /// Records at or above the good threshold, in input order.
    pub good_zones: Vec<SectorRecord>,
    /// One bucket per [`ZoneCategory`], worst first.
    pub breakdown: Vec<CategoryBucket>,
    /// Best performers, highest first.
    pub top_performers: Vec<SectorRecord>,
    /// Worst performers, lowest first.
    pub bottom_performers: Vec<SectorRecord>,
    /// Thresholds the partition was computed with.
    pub thresholds: ZoneThresholds,
}

impl AnalyticsSummary {
    /// Returns the records of one zone category.
    #[must_use]
    pub fn zone(&self, category: ZoneCategory) -> &[SectorRecord] {
        match category {
            ZoneCategory::Critical => &self.critical_zones,
            ZoneCategory::Moderate => &self.moderate_zones,
            ZoneCategory::Good => &self.good_zones,
        }
    }
}
