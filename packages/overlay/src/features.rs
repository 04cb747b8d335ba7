//! Typed view of the sector features in an all-sectors `GeoJSON` payload.

use geo::{Contains, MultiPolygon, Point};
use geojson::{Feature, FeatureCollection};
use green_cover_sector_models::{GreenCover, SectorId};
use thiserror::Error;

use crate::bounds::LngLatBounds;

/// Feature property holding the sector name.
pub const NAME_PROPERTY: &str = "name";

/// Feature property holding the green cover percentage.
pub const GREEN_COVER_PROPERTY: &str = "green_cover";

/// A feature that does not satisfy the overlay data contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// A required property is absent.
    #[error("feature {index} has no {property:?} property")]
    MissingProperty {
        /// Position of the feature in the collection.
        index: usize,
        /// Name of the missing property.
        property: &'static str,
    },

    /// A property has the wrong type or an out-of-range value.
    #[error("feature {index} has an invalid {property:?} property: {message}")]
    InvalidProperty {
        /// Position of the feature in the collection.
        index: usize,
        /// Name of the offending property.
        property: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The geometry is missing, empty, or not a (multi)polygon.
    #[error("feature {index} has unusable geometry: {message}")]
    Geometry {
        /// Position of the feature in the collection.
        index: usize,
        /// What was wrong with it.
        message: String,
    },
}

/// One sector boundary with its green cover.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorFeature {
    /// Raw `name` property.
    pub name: String,
    /// `name` resolved through the canonical sector normalizer, `None`
    /// when it does not name a sector.
    pub sector: Option<SectorId>,
    /// Green cover of the sector.
    pub green_cover: GreenCover,
    /// Boundary geometry.
    pub geometry: MultiPolygon<f64>,
    /// Bounding box of [`Self::geometry`].
    pub bounds: LngLatBounds,
}

impl SectorFeature {
    /// Extracts a sector feature from a `GeoJSON` feature.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the `name` or `green_cover` property is
    /// missing or malformed, or if the geometry is not a non-empty
    /// `Polygon`/`MultiPolygon`.
    pub fn from_feature(index: usize, feature: &Feature) -> Result<Self, FeatureError> {
        let name = feature
            .property(NAME_PROPERTY)
            .ok_or(FeatureError::MissingProperty {
                index,
                property: NAME_PROPERTY,
            })?
            .as_str()
            .ok_or_else(|| FeatureError::InvalidProperty {
                index,
                property: NAME_PROPERTY,
                message: "expected a string".to_string(),
            })?
            .to_string();

        let raw_cover = feature
            .property(GREEN_COVER_PROPERTY)
            .ok_or(FeatureError::MissingProperty {
                index,
                property: GREEN_COVER_PROPERTY,
            })?
            .as_f64()
            .ok_or_else(|| FeatureError::InvalidProperty {
                index,
                property: GREEN_COVER_PROPERTY,
                message: "expected a number".to_string(),
            })?;
        let green_cover =
            GreenCover::new(raw_cover).map_err(|e| FeatureError::InvalidProperty {
                index,
                property: GREEN_COVER_PROPERTY,
                message: e.to_string(),
            })?;

        let geometry = to_multipolygon(index, feature)?;
        let bounds = LngLatBounds::of(&geometry).ok_or_else(|| FeatureError::Geometry {
            index,
            message: "geometry has no coordinates".to_string(),
        })?;

        let sector = name.parse().ok();
        if sector.is_none() {
            log::warn!("Feature {index} name {name:?} does not name a sector");
        }

        Ok(Self {
            name,
            sector,
            green_cover,
            geometry,
            bounds,
        })
    }

    /// Whether the point `(lng, lat)` lies inside the sector boundary.
    #[must_use]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        self.bounds.contains(lng, lat) && self.geometry.contains(&Point::new(lng, lat))
    }
}

/// Extracts every sector feature from a collection, in collection order.
///
/// # Errors
///
/// Returns the first [`FeatureError`] encountered.
pub fn parse_collection(collection: &FeatureCollection) -> Result<Vec<SectorFeature>, FeatureError> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| SectorFeature::from_feature(index, feature))
        .collect()
}

fn to_multipolygon(index: usize, feature: &Feature) -> Result<MultiPolygon<f64>, FeatureError> {
    let geometry = feature.geometry.clone().ok_or_else(|| FeatureError::Geometry {
        index,
        message: "feature has no geometry".to_string(),
    })?;

    let geometry: geo::Geometry<f64> =
        geometry.try_into().map_err(|e: geojson::Error| FeatureError::Geometry {
            index,
            message: e.to_string(),
        })?;

    match geometry {
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        geo::Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        other => Err(FeatureError::Geometry {
            index,
            message: format!("expected Polygon or MultiPolygon, got {}", geometry_kind(&other)),
        }),
    }
}

const fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{collection, square};
    use super::*;

    #[test]
    fn parses_polygon_feature() {
        let feature = square("Sector 22", 38.5, 76.77, 30.73, 0.01);

        let parsed = SectorFeature::from_feature(0, &feature).unwrap();

        assert_eq!(parsed.sector.map(SectorId::number), Some(22));
        assert!((parsed.green_cover.value() - 38.5).abs() < f64::EPSILON);
        assert!((parsed.bounds.east - 76.78).abs() < 1e-9);
    }

    #[test]
    fn parses_multipolygon_feature() {
        let feature: Feature = serde_json::from_value(serde_json::json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                ]
            },
            "properties": {"name": "Sector 1", "green_cover": 10}
        }))
        .unwrap();

        let parsed = SectorFeature::from_feature(0, &feature).unwrap();

        assert_eq!(parsed.geometry.0.len(), 2);
        assert!((parsed.bounds.north - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_green_cover_is_rejected() {
        let mut feature = square("Sector 2", 50.0, 0.0, 0.0, 1.0);
        feature.properties.as_mut().unwrap().remove("green_cover");

        let err = SectorFeature::from_feature(3, &feature).unwrap_err();

        assert_eq!(
            err,
            FeatureError::MissingProperty {
                index: 3,
                property: GREEN_COVER_PROPERTY
            }
        );
    }

    #[test]
    fn out_of_range_green_cover_is_rejected() {
        let feature = square("Sector 2", 150.0, 0.0, 0.0, 1.0);
        assert!(matches!(
            SectorFeature::from_feature(0, &feature),
            Err(FeatureError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn point_geometry_is_rejected() {
        let feature: Feature = serde_json::from_value(serde_json::json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"name": "Sector 1", "green_cover": 10}
        }))
        .unwrap();

        assert!(matches!(
            SectorFeature::from_feature(0, &feature),
            Err(FeatureError::Geometry { .. })
        ));
    }

    #[test]
    fn unrecognized_name_is_kept_but_unresolved() {
        let feature = square("Rose Garden", 70.0, 0.0, 0.0, 1.0);
        let parsed = SectorFeature::from_feature(0, &feature).unwrap();
        assert_eq!(parsed.name, "Rose Garden");
        assert!(parsed.sector.is_none());
    }

    #[test]
    fn hit_test_uses_geometry() {
        let parsed = SectorFeature::from_feature(0, &square("Sector 9", 10.0, 0.0, 0.0, 1.0)).unwrap();
        assert!(parsed.contains(0.5, 0.5));
        assert!(!parsed.contains(1.5, 0.5));
    }

    #[test]
    fn parse_collection_keeps_order_and_fails_fast() {
        let ok = collection(vec![
            square("Sector 2", 20.0, 0.0, 0.0, 1.0),
            square("Sector 1", 30.0, 2.0, 0.0, 1.0),
        ]);
        let parsed = parse_collection(&ok).unwrap();
        assert_eq!(parsed[0].name, "Sector 2");
        assert_eq!(parsed[1].name, "Sector 1");

        let mut bad_feature = square("Sector 3", 30.0, 4.0, 0.0, 1.0);
        bad_feature.geometry = None;
        let bad = collection(vec![square("Sector 2", 20.0, 0.0, 0.0, 1.0), bad_feature]);
        assert!(matches!(
            parse_collection(&bad),
            Err(FeatureError::Geometry { index: 1, .. })
        ));
    }
}
