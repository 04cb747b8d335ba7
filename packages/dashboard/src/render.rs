//! Server-side HTML for the dashboard page.

use std::fmt::Write as _;

use green_cover_analytics_models::{AnalyticsSummary, ZoneCategory};
use green_cover_dashboard_models::DashboardTab;
use green_cover_overlay::popup::html_escape;
use green_cover_overlay::{MapProjection, MessageLevel, color_for, legend};
use green_cover_sector_models::SectorRecord;

use crate::config::MapSettings;
use crate::shell::{DashboardPage, ViewState};

const MAPBOX_GL_VERSION: &str = "v3.9.0";
const PLACEHOLDER: &str = "-";
const NO_DATA: &str = "No sector data loaded yet.";

const CHART_WIDTH: u32 = 480;
const CHART_LABEL_WIDTH: u32 = 110;
const CHART_BAR_WIDTH: u32 = 300;
const CHART_ROW_HEIGHT: u32 = 28;

/// Renders the full dashboard page.
#[must_use]
pub fn render_page(page: &DashboardPage, map: &MapSettings) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Sector Green Cover</title>
  <link rel="stylesheet" href="https://api.mapbox.com/mapbox-gl-js/{MAPBOX_GL_VERSION}/mapbox-gl.css">
  <link rel="stylesheet" href="/static/dashboard.css">
  <script src="https://api.mapbox.com/mapbox-gl-js/{MAPBOX_GL_VERSION}/mapbox-gl.js"></script>
</head>
<body>
  <header>
    <h1>Sector Green Cover Dashboard</h1>
    {message}
  </header>
  <main>
    {controls}
    {selection}
    {cards}
    {tabs}
    {panel}
  </main>
  <script id="map-config" type="application/json">{map_config}</script>
  <script src="/static/dashboard.js"></script>
</body>
</html>
"#,
        message = status_message(&page.projection),
        controls = controls(page),
        selection = selection(page),
        cards = metric_cards(page.summary.as_ref()),
        tabs = tabs(&page.view),
        panel = match page.view.tab {
            DashboardTab::Map => map_panel(&page.projection),
            DashboardTab::Analytics => analytics_panel(page.summary.as_ref()),
            DashboardTab::Critical => critical_panel(page.summary.as_ref(), &page.critical_worst_first),
        },
        map_config = map_config(page, map),
    )
}

fn status_message(projection: &MapProjection) -> String {
    projection.message.as_ref().map_or_else(
        || r#"<div id="status-message" class="status" hidden></div>"#.to_string(),
        |m| {
            let class = match m.level {
                MessageLevel::Info => "status info",
                MessageLevel::Success => "status success",
                MessageLevel::Error => "status error",
            };
            format!(
                r#"<div id="status-message" class="{class}">{}</div>"#,
                html_escape(&m.text)
            )
        },
    )
}

fn controls(page: &DashboardPage) -> String {
    let mut options = String::new();
    for sector in &page.options {
        let selected = if page.view.selected == Some(*sector) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{}"{selected}>{}</option>"#,
            sector.slug(),
            sector.display_name()
        );
    }

    format!(
        r#"<form class="controls" method="get" action="/">
      <input type="hidden" name="tab" value="{tab}">
      <input type="search" name="q" value="{query}" placeholder="Search sectors">
      <select name="sector" id="sector-select">
        <option value="">Select a sector</option>{options}
      </select>
      <button type="submit">Show</button>
    </form>"#,
        tab = page.view.tab,
        query = html_escape(&page.view.query),
    )
}

fn selection(page: &DashboardPage) -> String {
    let Some(sector) = page.view.selected else {
        return r#"<section class="selection"><p class="placeholder">Select a sector to see its green cover.</p></section>"#
            .to_string();
    };

    let (value, color) = page.selected_record.map_or_else(
        || (PLACEHOLDER.to_string(), "inherit"),
        |r| (format!("{:.2}%", r.value()), color_for(r.value())),
    );

    format!(
        r#"<section class="selection" data-sector="{slug}">
      <h2>{name}</h2>
      <p class="selected-value" id="selected-value" style="color: {color};">{value}</p>
      <button type="button" id="lookup-button" data-sector="{slug}">Recalculate</button>
      <p class="lookup-error" id="lookup-error" hidden></p>
    </section>"#,
        slug = sector.slug(),
        name = sector.display_name(),
    )
}

fn metric_cards(summary: Option<&AnalyticsSummary>) -> String {
    let record_text = |r: &SectorRecord| format!("{} ({:.1}%)", r.sector, r.value());

    let cards = [
        ("Total Sectors", summary.map(|s| s.total.to_string())),
        ("Average Green Cover", summary.map(|s| format!("{:.1}%", s.average))),
        ("Highest", summary.map(|s| record_text(&s.highest))),
        ("Lowest", summary.map(|s| record_text(&s.lowest))),
        ("Critical Zones", summary.map(|s| s.critical_zones.len().to_string())),
    ];

    let mut html = String::from(r#"<section class="metrics">"#);
    for (title, value) in cards {
        let _ = write!(
            html,
            r#"<div class="metric-card"><h3>{title}</h3><p>{}</p></div>"#,
            value.as_deref().unwrap_or(PLACEHOLDER)
        );
    }
    html.push_str("</section>");
    html
}

fn tabs(view: &ViewState) -> String {
    let mut buttons = String::new();
    for tab in DashboardTab::all() {
        let class = if *tab == view.tab { "tab active" } else { "tab" };
        let _ = write!(
            buttons,
            r#"<button type="submit" name="tab" value="{tab}" class="{class}">{}</button>"#,
            tab.label()
        );
    }

    let sector = view.selected.map(|s| s.slug()).unwrap_or_default();
    format!(
        r#"<form class="tabs" method="get" action="/">
      <input type="hidden" name="sector" value="{sector}">
      <input type="hidden" name="q" value="{query}">
      {buttons}
    </form>"#,
        query = html_escape(&view.query),
    )
}

fn map_panel(projection: &MapProjection) -> String {
    let mut legend_rows = String::new();
    for entry in legend() {
        let _ = write!(
            legend_rows,
            r#"<li><span class="swatch" style="background: {};"></span>{}</li>"#,
            entry.color, entry.range
        );
    }

    let failed = if projection.failed_sectors.is_empty() {
        String::new()
    } else {
        let names: Vec<String> = projection
            .failed_sectors
            .iter()
            .map(|s| s.display_name())
            .collect();
        format!(
            r#"<p class="failed-sectors">Not computed: {}</p>"#,
            names.join(", ")
        )
    };

    let loaded = projection.loaded_at.map_or_else(String::new, |at| {
        format!(
            r#"<p class="loaded-at">{} sectors loaded at {}</p>"#,
            projection.sector_count,
            at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    });

    format!(
        r#"<section class="panel map-panel">
      <div id="map"></div>
      <aside class="map-sidebar">
        <button type="button" id="refresh-button">Refresh Data</button>
        {loaded}
        {failed}
        <h3>Green Cover</h3>
        <ul class="legend">{legend_rows}</ul>
      </aside>
    </section>"#
    )
}

fn analytics_panel(summary: Option<&AnalyticsSummary>) -> String {
    let Some(summary) = summary else {
        return empty_panel("analytics-panel");
    };

    let breakdown: Vec<Bar> = summary
        .breakdown
        .iter()
        .map(|b| Bar {
            label: b.category.label().to_string(),
            value: b.share,
            color: b.category.color(),
            text: format!("{} ({:.1}%)", b.count, b.share),
        })
        .collect();

    format!(
        r#"<section class="panel analytics-panel">
      <p class="thresholds">Critical below {critical:.1}%, good from {good:.1}%</p>
      {categories}
      {top}
      {bottom}
    </section>"#,
        critical = summary.thresholds.critical_below(),
        good = summary.thresholds.good_from(),
        categories = bar_chart("Zone Breakdown", &breakdown),
        top = bar_chart("Top Performers", &performer_bars(&summary.top_performers)),
        bottom = bar_chart("Needs Attention", &performer_bars(&summary.bottom_performers)),
    )
}

fn critical_panel(summary: Option<&AnalyticsSummary>, worst_first: &[SectorRecord]) -> String {
    let Some(summary) = summary else {
        return empty_panel("critical-panel");
    };

    if worst_first.is_empty() {
        return format!(
            r#"<section class="panel critical-panel"><p class="placeholder">No sectors below {:.1}%.</p></section>"#,
            summary.thresholds.critical_below()
        );
    }

    let mut rows = String::new();
    for (rank, record) in worst_first.iter().enumerate() {
        let _ = write!(
            rows,
            r#"<tr><td>{}</td><td>{}</td><td><span class="swatch" style="background: {};"></span>{:.2}%</td></tr>"#,
            rank + 1,
            record.sector,
            color_for(record.value()),
            record.value()
        );
    }

    format!(
        r#"<section class="panel critical-panel">
      <h3>{title} ({count})</h3>
      <table>
        <thead><tr><th>#</th><th>Sector</th><th>Green Cover</th></tr></thead>
        <tbody>{rows}</tbody>
      </table>
    </section>"#,
        title = ZoneCategory::Critical.label(),
        count = worst_first.len(),
    )
}

fn empty_panel(class: &str) -> String {
    format!(r#"<section class="panel {class}"><p class="placeholder">{NO_DATA}</p></section>"#)
}

struct Bar {
    label: String,
    /// Percentage, drawn against a 0-100 scale.
    value: f64,
    color: &'static str,
    text: String,
}

fn performer_bars(records: &[SectorRecord]) -> Vec<Bar> {
    records
        .iter()
        .map(|r| Bar {
            label: r.sector.display_name(),
            value: r.value(),
            color: color_for(r.value()),
            text: format!("{:.1}%", r.value()),
        })
        .collect()
}

fn bar_chart(title: &str, bars: &[Bar]) -> String {
    let row_count = u32::try_from(bars.len()).unwrap_or(u32::MAX);
    let height = row_count.saturating_mul(CHART_ROW_HEIGHT).max(CHART_ROW_HEIGHT);

    let mut rows = String::new();
    for (i, bar) in bars.iter().enumerate() {
        let y = u32::try_from(i).unwrap_or(u32::MAX).saturating_mul(CHART_ROW_HEIGHT);
        let width = bar.value.clamp(0.0, 100.0) / 100.0 * f64::from(CHART_BAR_WIDTH);
        let _ = write!(
            rows,
            r#"<g transform="translate(0,{y})"><text x="0" y="18">{label}</text><rect x="{CHART_LABEL_WIDTH}" y="4" width="{width:.1}" height="20" fill="{color}"></rect><text x="{text_x:.1}" y="18">{text}</text></g>"#,
            label = html_escape(&bar.label),
            color = bar.color,
            text_x = f64::from(CHART_LABEL_WIDTH) + width + 6.0,
            text = html_escape(&bar.text),
        );
    }

    format!(
        r#"<figure class="chart"><figcaption>{title}</figcaption><svg width="{CHART_WIDTH}" height="{height}" viewBox="0 0 {CHART_WIDTH} {height}" role="img">{rows}</svg></figure>"#
    )
}

fn map_config(page: &DashboardPage, map: &MapSettings) -> String {
    serde_json::json!({
        "token": map.token,
        "style": map.style,
        "center": map.center,
        "zoom": map.zoom,
        "selected": page.view.selected.map(|s| s.slug()),
    })
    .to_string()
    .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use green_cover_analytics_models::ZoneThresholds;
    use green_cover_dashboard_models::ViewParams;
    use green_cover_overlay::OverlayState;
    use green_cover_sector_models::{GreenCover, SectorId};

    use super::*;
    use crate::config::DashboardConfig;

    fn record(n: u16, cover: f64) -> SectorRecord {
        SectorRecord::new(SectorId::new(n).unwrap(), GreenCover::new(cover).unwrap())
    }

    fn page(tab: &str, records: &[SectorRecord]) -> String {
        let view = ViewState::from_params(&ViewParams {
            sector: Some("Sector_2".to_string()),
            tab: Some(tab.to_string()),
            q: None,
        });
        let page = DashboardPage::compose(
            view,
            records,
            &ZoneThresholds::default(),
            OverlayState::new().project(Utc::now()),
        );
        render_page(&page, &DashboardConfig::defaults().map)
    }

    #[test]
    fn empty_data_renders_placeholders_in_every_tab() {
        for tab in ["map", "analytics", "critical"] {
            let html = page(tab, &[]);
            assert!(html.contains(r#"<h3>Total Sectors</h3><p>-</p>"#), "{tab}");
            if tab != "map" {
                assert!(html.contains(NO_DATA), "{tab}");
            }
        }
    }

    #[test]
    fn metric_cards_show_summary() {
        let html = page("map", &[record(1, 25.0), record(2, 55.0), record(3, 70.0)]);
        assert!(html.contains("<h3>Average Green Cover</h3><p>50.0%</p>"));
        assert!(html.contains("<h3>Highest</h3><p>Sector 3 (70.0%)</p>"));
        assert!(html.contains("<h3>Lowest</h3><p>Sector 1 (25.0%)</p>"));
        assert!(html.contains("<h3>Critical Zones</h3><p>1</p>"));
    }

    #[test]
    fn selected_sector_is_marked() {
        let html = page("map", &[record(2, 55.0)]);
        assert!(html.contains(r#"<option value="Sector_2" selected>Sector 2</option>"#));
        assert!(html.contains("55.00%"));
        assert!(html.contains(r#""selected":"Sector_2""#));
    }

    #[test]
    fn active_tab_only_renders_its_panel() {
        let records = [record(1, 10.0), record(2, 90.0)];

        let analytics = page("analytics", &records);
        assert!(analytics.contains("Top Performers"));
        assert!(!analytics.contains(r#"id="map""#));
        assert!(analytics.contains(r#"value="analytics" class="tab active""#));

        let critical = page("critical", &records);
        assert!(critical.contains("<td>Sector 1</td>"));
        assert!(!critical.contains("Top Performers"));

        let map = page("map", &records);
        assert!(map.contains(r#"<div id="map"></div>"#));
        assert!(map.contains("80%+"));
    }

    #[test]
    fn no_critical_zones_is_neutral() {
        let html = page("critical", &[record(1, 90.0)]);
        assert!(html.contains("No sectors below 43.5%."));
    }

    #[test]
    fn bar_widths_scale_to_percent() {
        let svg = bar_chart(
            "Test",
            &performer_bars(&[record(1, 50.0), record(2, 100.0)]),
        );
        assert!(svg.contains(r#"width="150.0""#));
        assert!(svg.contains(r#"width="300.0""#));
    }

    #[test]
    fn search_text_is_escaped() {
        let view = ViewState::from_params(&ViewParams {
            sector: None,
            tab: None,
            q: Some(r#""><script>"#.to_string()),
        });
        let page = DashboardPage::compose(
            view,
            &[],
            &ZoneThresholds::default(),
            OverlayState::new().project(Utc::now()),
        );
        let html = render_page(&page, &DashboardConfig::defaults().map);
        assert!(!html.contains(r#""><script>"#));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
