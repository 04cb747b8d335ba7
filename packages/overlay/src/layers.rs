//! Source and layer descriptions handed to the map engine.

use geojson::FeatureCollection;
use serde::Serialize;

use crate::features::GREEN_COVER_PROPERTY;
use crate::palette::color_expression;

/// Id of the `GeoJSON` source holding every sector.
pub const SOURCE_ID: &str = "all-sectors";
/// Id of the filled polygon layer.
pub const FILL_LAYER_ID: &str = "all-sectors-fill";
/// Id of the outline layer.
pub const LINE_LAYER_ID: &str = "all-sectors-line";

pub const FILL_OPACITY: f64 = 0.6;
pub const LINE_WIDTH: f64 = 2.0;

/// Viewport padding in pixels when fitting every sector.
pub const FIT_PADDING: u32 = 50;
/// Viewport padding in pixels when focusing one sector.
pub const FOCUS_PADDING: u32 = 100;
/// Animation length of a focus move.
pub const FOCUS_DURATION_MS: u32 = 1000;

/// A `geojson` source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSpec {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: FeatureCollection,
}

impl SourceSpec {
    #[must_use]
    pub const fn sectors(data: FeatureCollection) -> Self {
        Self {
            id: SOURCE_ID,
            kind: "geojson",
            data,
        }
    }
}

/// A style layer drawing [`SOURCE_ID`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub source: &'static str,
    pub paint: serde_json::Value,
}

impl LayerSpec {
    /// Semi-transparent fill colored by green cover.
    #[must_use]
    pub fn fill() -> Self {
        Self {
            id: FILL_LAYER_ID,
            kind: "fill",
            source: SOURCE_ID,
            paint: serde_json::json!({
                "fill-color": color_expression(GREEN_COVER_PROPERTY),
                "fill-opacity": FILL_OPACITY,
            }),
        }
    }

    /// Outline in the same color as the fill.
    #[must_use]
    pub fn line() -> Self {
        Self {
            id: LINE_LAYER_ID,
            kind: "line",
            source: SOURCE_ID,
            paint: serde_json::json!({
                "line-color": color_expression(GREEN_COVER_PROPERTY),
                "line-width": LINE_WIDTH,
            }),
        }
    }

    /// Both sector layers in draw order.
    #[must_use]
    pub fn sector_layers() -> Vec<Self> {
        vec![Self::fill(), Self::line()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_reference_the_sector_source() {
        let layers = LayerSpec::sector_layers();
        assert_eq!(layers.len(), 2);
        assert!(layers.iter().all(|l| l.source == SOURCE_ID));
        assert_eq!(layers[0].id, "all-sectors-fill");
        assert_eq!(layers[1].id, "all-sectors-line");
    }

    #[test]
    fn fill_and_line_share_the_color_rule() {
        let fill = LayerSpec::fill();
        let line = LayerSpec::line();
        assert_eq!(fill.paint["fill-color"], line.paint["line-color"]);
        assert_eq!(fill.paint["fill-opacity"], 0.6);
        assert_eq!(line.paint["line-width"], 2.0);
    }

    #[test]
    fn serializes_type_field() {
        let json = serde_json::to_value(LayerSpec::fill()).unwrap();
        assert_eq!(json["type"], "fill");
        assert_eq!(json["source"], "all-sectors");
    }
}
