//! Click popups.

use serde::Serialize;

use crate::features::SectorFeature;
use crate::palette::color_for;

/// Transient info shown where a sector was clicked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorPopup {
    pub name: String,
    pub green_cover: f64,
    /// Bucket color of [`Self::green_cover`], also used for the bar.
    pub color: &'static str,
    pub lng: f64,
    pub lat: f64,
    pub html: String,
}

impl SectorPopup {
    #[must_use]
    pub fn new(feature: &SectorFeature, lng: f64, lat: f64) -> Self {
        let green_cover = feature.green_cover.value();
        let color = color_for(green_cover);
        let name = feature
            .sector
            .map_or_else(|| feature.name.clone(), |s| s.display_name());
        let html = popup_html(&name, green_cover, color);

        Self {
            name,
            green_cover,
            color,
            lng,
            lat,
            html,
        }
    }
}

fn popup_html(name: &str, green_cover: f64, color: &str) -> String {
    format!(
        r#"<div class="sector-popup">
  <h3>{name}</h3>
  <p>Green Cover: <strong>{green_cover:.2}%</strong></p>
  <div class="popup-bar"><div class="popup-bar-fill" style="width: {width:.1}%; background: {color};"></div></div>
</div>"#,
        name = html_escape(name),
        width = green_cover.clamp(0.0, 100.0),
    )
}

/// Escapes text for use in HTML bodies and quoted attributes.
#[must_use]
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
