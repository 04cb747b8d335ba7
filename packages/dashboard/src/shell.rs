//! View state and page composition.
//!
//! The shell holds no data of its own. It reads the selected sector,
//! active tab and search text from the query string, and derives
//! everything else from the overlay's loaded stats.

use green_cover_analytics::{matches_query, summarize};
use green_cover_analytics_models::{AnalyticsSummary, ZoneThresholds};
use green_cover_dashboard_models::{DashboardTab, ViewParams};
use green_cover_overlay::MapProjection;
use green_cover_sector_models::{SectorId, SectorRecord};

/// What the user is looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selected: Option<SectorId>,
    pub tab: DashboardTab,
    pub query: String,
}

impl ViewState {
    /// Parses query parameters. Unknown sectors and tabs fall back to no
    /// selection and the map tab.
    #[must_use]
    pub fn from_params(params: &ViewParams) -> Self {
        let selected = params
            .sector
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match s.parse::<SectorId>() {
                Ok(sector) => Some(sector),
                Err(e) => {
                    log::debug!("Ignoring selection: {e}");
                    None
                }
            });

        let tab = params
            .tab
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();

        Self {
            selected,
            tab,
            query: params.q.as_deref().unwrap_or_default().trim().to_string(),
        }
    }
}

/// Everything one render of the dashboard needs.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub view: ViewState,
    /// `None` until at least one sector is loaded.
    pub summary: Option<AnalyticsSummary>,
    /// Selectable sectors matching the search text, plus the current
    /// selection.
    pub options: Vec<SectorId>,
    /// Loaded record of the selected sector.
    pub selected_record: Option<SectorRecord>,
    /// Critical zones, worst first.
    pub critical_worst_first: Vec<SectorRecord>,
    pub projection: MapProjection,
}

impl DashboardPage {
    #[must_use]
    pub fn compose(
        view: ViewState,
        records: &[SectorRecord],
        thresholds: &ZoneThresholds,
        projection: MapProjection,
    ) -> Self {
        let summary = summarize(records, thresholds);

        let options = SectorId::all()
            .iter()
            .copied()
            .filter(|s| matches_query(*s, &view.query) || view.selected == Some(*s))
            .collect();

        let selected_record = view
            .selected
            .and_then(|s| records.iter().find(|r| r.sector == s).copied());

        let critical_worst_first = summary
            .as_ref()
            .map(|s| {
                let mut zones = s.critical_zones.clone();
                zones.sort_by(|a, b| a.value().total_cmp(&b.value()));
                zones
            })
            .unwrap_or_default();

        Self {
            view,
            summary,
            options,
            selected_record,
            critical_worst_first,
            projection,
        }
    }
}

#[cfg(test)]
mod tests {
    use green_cover_overlay::OverlayState;
    use green_cover_sector_models::GreenCover;

    use super::*;

    fn params(sector: Option<&str>, tab: Option<&str>, q: Option<&str>) -> ViewParams {
        ViewParams {
            sector: sector.map(ToString::to_string),
            tab: tab.map(ToString::to_string),
            q: q.map(ToString::to_string),
        }
    }

    fn record(n: u16, cover: f64) -> SectorRecord {
        SectorRecord::new(SectorId::new(n).unwrap(), GreenCover::new(cover).unwrap())
    }

    fn empty_projection() -> MapProjection {
        OverlayState::new().project(chrono::Utc::now())
    }

    #[test]
    fn view_accepts_any_sector_spelling() {
        let view = ViewState::from_params(&params(Some("Sector_12"), Some("analytics"), None));
        assert_eq!(view.selected, Some(SectorId::new(12).unwrap()));
        assert_eq!(view.tab, DashboardTab::Analytics);
    }

    #[test]
    fn bad_params_fall_back_to_defaults() {
        let view = ViewState::from_params(&params(Some("Park"), Some("charts"), Some("  ")));
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn options_follow_search_and_keep_selection() {
        let view = ViewState::from_params(&params(Some("3"), None, Some("sector 4")));
        let page = DashboardPage::compose(view, &[], &ZoneThresholds::default(), empty_projection());

        let numbers: Vec<u16> = page.options.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[test]
    fn critical_zones_are_listed_worst_first() {
        let records = [record(1, 40.0), record(2, 12.5), record(3, 70.0), record(4, 30.0)];

        let page = DashboardPage::compose(
            ViewState::default(),
            &records,
            &ZoneThresholds::default(),
            empty_projection(),
        );

        let order: Vec<u16> = page
            .critical_worst_first
            .iter()
            .map(|r| r.sector.number())
            .collect();
        assert_eq!(order, vec![2, 4, 1]);
    }

    #[test]
    fn selected_record_comes_from_loaded_stats() {
        let records = [record(7, 55.0)];
        let view = ViewState::from_params(&params(Some("sector 7"), None, None));

        let page = DashboardPage::compose(view, &records, &ZoneThresholds::default(), empty_projection());

        assert_eq!(page.selected_record, Some(records[0]));
    }

    #[test]
    fn empty_stats_have_no_summary() {
        let page = DashboardPage::compose(
            ViewState::default(),
            &[],
            &ZoneThresholds::default(),
            empty_projection(),
        );
        assert!(page.summary.is_none());
        assert!(page.critical_worst_first.is_empty());
        assert_eq!(page.options.len(), SectorId::all().len());
    }
}
