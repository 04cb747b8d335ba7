//! Green cover color ramp.
//!
//! A fixed eight-bucket step function from dark red to dark green. The
//! same table drives the fill and outline color expressions, the legend,
//! and popup bars, so they can never disagree.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// One step of the color ramp. Each bucket covers `[previous bound, bound)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorBucket {
    /// Below 20%.
    Below20,
    /// 20% up to 30%.
    Below30,
    /// 30% up to 40%.
    Below40,
    /// 40% up to 50%.
    Below50,
    /// 50% up to 60%.
    Below60,
    /// 60% up to 70%.
    Below70,
    /// 70% up to 80%.
    Below80,
    /// 80% and above.
    AtLeast80,
}

impl ColorBucket {
    /// Exclusive upper bound, `None` for the last bucket.
    #[must_use]
    pub const fn upper_bound(self) -> Option<f64> {
        match self {
            Self::Below20 => Some(20.0),
            Self::Below30 => Some(30.0),
            Self::Below40 => Some(40.0),
            Self::Below50 => Some(50.0),
            Self::Below60 => Some(60.0),
            Self::Below70 => Some(70.0),
            Self::Below80 => Some(80.0),
            Self::AtLeast80 => None,
        }
    }

    /// Hex color of the bucket.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Below20 => "#8B0000",
            Self::Below30 => "#FF0000",
            Self::Below40 => "#FF4500",
            Self::Below50 => "#FF8C00",
            Self::Below60 => "#FFD700",
            Self::Below70 => "#ADFF2F",
            Self::Below80 => "#32CD32",
            Self::AtLeast80 => "#006400",
        }
    }

    /// Legend label of the bucket.
    #[must_use]
    pub const fn range_label(self) -> &'static str {
        match self {
            Self::Below20 => "<20%",
            Self::Below30 => "20-30%",
            Self::Below40 => "30-40%",
            Self::Below50 => "40-50%",
            Self::Below60 => "50-60%",
            Self::Below70 => "60-70%",
            Self::Below80 => "70-80%",
            Self::AtLeast80 => "80%+",
        }
    }

    /// Returns all buckets, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Below20,
            Self::Below30,
            Self::Below40,
            Self::Below50,
            Self::Below60,
            Self::Below70,
            Self::Below80,
            Self::AtLeast80,
        ]
    }

    /// The bucket containing `green_cover`.
    #[must_use]
    pub fn for_value(green_cover: f64) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|bucket| bucket.upper_bound().is_none_or(|bound| green_cover < bound))
            .unwrap_or(Self::AtLeast80)
    }
}

/// Hex color for a green cover percentage.
#[must_use]
pub fn color_for(green_cover: f64) -> &'static str {
    ColorBucket::for_value(green_cover).color()
}

/// One row of the map legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Range label, e.g. `"50-60%"`.
    pub range: &'static str,
    /// Hex color.
    pub color: &'static str,
}

/// Legend rows, highest bucket first.
#[must_use]
pub fn legend() -> Vec<LegendEntry> {
    ColorBucket::all()
        .iter()
        .rev()
        .map(|b| LegendEntry {
            range: b.range_label(),
            color: b.color(),
        })
        .collect()
}

/// Map-style `case` expression coloring features by a numeric property.
///
/// Produces `["case", ["<", ["get", property], 20], "#8B0000", ...,
/// "#006400"]`.
#[must_use]
pub fn color_expression(property: &str) -> serde_json::Value {
    let mut expr = vec![serde_json::json!("case")];
    for bucket in ColorBucket::all() {
        match bucket.upper_bound() {
            Some(bound) => {
                expr.push(serde_json::json!(["<", ["get", property], bound]));
                expr.push(serde_json::json!(bucket.color()));
            }
            None => expr.push(serde_json::json!(bucket.color())),
        }
    }
    serde_json::Value::Array(expr)
}
