//! Longitude/latitude bounding boxes for viewport fitting.

use geo::{BoundingRect, Rect};
use serde::{Serialize, Serializer};

/// An axis-aligned box in WGS84 degrees.
///
/// Serializes as `[[west, south], [east, north]]`, the shape map engines
/// accept for `fitBounds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLatBounds {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl LngLatBounds {
    /// Bounds of a `geo` rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            west: rect.min().x,
            south: rect.min().y,
            east: rect.max().x,
            north: rect.max().y,
        }
    }

    /// Bounds of any `geo` geometry, `None` when it has no coordinates.
    #[must_use]
    pub fn of<G: BoundingRect<f64>>(geometry: &G) -> Option<Self> {
        let rect: Option<Rect<f64>> = geometry.bounding_rect().into();
        rect.map(Self::from_rect)
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Whether the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        (self.west..=self.east).contains(&lng) && (self.south..=self.north).contains(&lat)
    }
}

impl Serialize for LngLatBounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [[self.west, self.south], [self.east, self.north]].serialize(serializer)
    }
}

/// Union of every box in `bounds`, `None` if the iterator is empty.
pub fn union_all(bounds: impl IntoIterator<Item = LngLatBounds>) -> Option<LngLatBounds> {
    bounds.into_iter().reduce(LngLatBounds::union)
}
