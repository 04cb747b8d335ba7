#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Summary analytics over per-sector green cover records.
//!
//! Every function here is a pure, deterministic function of its input list:
//! the same records in the same order always produce the same summary.
//! Ranking uses a stable sort so ties keep their input order.

pub mod ranking;
pub mod search;

use green_cover_analytics_models::{
    AnalyticsSummary, CategoryBucket, PERFORMER_COUNT, ZoneCategory, ZoneThresholds,
};
use green_cover_sector_models::SectorRecord;

pub use ranking::{bottom_performers, rank_descending, top_performers};
pub use search::matches_query;

/// Rounds a value to one decimal place.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean of all green cover values, or `None` for an empty list.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(records: &[SectorRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(SectorRecord::value).sum();
    Some(sum / records.len() as f64)
}

/// Splits records into critical, moderate and good zones.
///
/// Each record lands in exactly one list; input order is preserved within
/// each list.
#[must_use]
pub fn partition(
    records: &[SectorRecord],
    thresholds: &ZoneThresholds,
) -> (Vec<SectorRecord>, Vec<SectorRecord>, Vec<SectorRecord>) {
    let mut critical = Vec::new();
    let mut moderate = Vec::new();
    let mut good = Vec::new();

    for record in records {
        match thresholds.classify(record.value()) {
            ZoneCategory::Critical => critical.push(*record),
            ZoneCategory::Moderate => moderate.push(*record),
            ZoneCategory::Good => good.push(*record),
        }
    }

    (critical, moderate, good)
}

/// Builds the three-bucket category breakdown used by the charts.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn breakdown(total: usize, critical: usize, moderate: usize, good: usize) -> Vec<CategoryBucket> {
    ZoneCategory::all()
        .iter()
        .map(|&category| {
            let count = match category {
                ZoneCategory::Critical => critical,
                ZoneCategory::Moderate => moderate,
                ZoneCategory::Good => good,
            };
            let share = if total == 0 {
                0.0
            } else {
                round_one_decimal(count as f64 / total as f64 * 100.0)
            };
            CategoryBucket {
                category,
                count,
                share,
            }
        })
        .collect()
}

/// Computes the full [`AnalyticsSummary`].
///
/// Returns `None` (the "no data" state) for an empty list.
#[must_use]
pub fn summarize(records: &[SectorRecord], thresholds: &ZoneThresholds) -> Option<AnalyticsSummary> {
    let mean = mean(records)?;
    let ranked = rank_descending(records);
    let highest = *ranked.first()?;
    let lowest = *ranked.last()?;

    let (critical_zones, moderate_zones, good_zones) = partition(records, thresholds);
    let breakdown = breakdown(
        records.len(),
        critical_zones.len(),
        moderate_zones.len(),
        good_zones.len(),
    );

    log::debug!(
        "Summarized {} sectors: mean={mean:.2}, critical={}, moderate={}, good={}",
        records.len(),
        critical_zones.len(),
        moderate_zones.len(),
        good_zones.len()
    );

    Some(AnalyticsSummary {
        total: records.len(),
        mean,
        average: round_one_decimal(mean),
        highest,
        lowest,
        critical_zones,
        moderate_zones,
        good_zones,
        breakdown,
        top_performers: top_performers(records, PERFORMER_COUNT),
        bottom_performers: bottom_performers(records, PERFORMER_COUNT),
        thresholds: *thresholds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use green_cover_sector_models::{GreenCover, SectorId};

    fn record(number: u16, green_cover: f64) -> SectorRecord {
        SectorRecord::new(
            SectorId::new(number).unwrap(),
            GreenCover::new(green_cover).unwrap(),
        )
    }

    fn numbers(records: &[SectorRecord]) -> Vec<u16> {
        records.iter().map(|r| r.sector.number()).collect()
    }

    #[test]
    fn empty_list_is_no_data() {
        assert!(summarize(&[], &ZoneThresholds::default()).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn three_sector_scenario_with_wide_thresholds() {
        let records = [record(1, 25.0), record(2, 55.0), record(3, 70.0)];
        let thresholds = ZoneThresholds::new(30.0, 60.0).unwrap();

        let summary = summarize(&records, &thresholds).unwrap();

        assert!((summary.average - 50.0).abs() < f64::EPSILON);
        assert_eq!(numbers(&summary.critical_zones), vec![1]);
        assert_eq!(numbers(&summary.moderate_zones), vec![2]);
        assert_eq!(numbers(&summary.good_zones), vec![3]);
    }

    #[test]
    fn three_sector_scenario_with_default_thresholds() {
        let records = [record(1, 25.0), record(2, 55.0), record(3, 70.0)];

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert_eq!(numbers(&summary.critical_zones), vec![1]);
        assert!(summary.moderate_zones.is_empty());
        assert_eq!(numbers(&summary.good_zones), vec![2, 3]);
    }

    #[test]
    fn partition_covers_every_record_once() {
        let records: Vec<SectorRecord> = SectorId::all()
            .iter()
            .enumerate()
            .map(|(i, id)| {
                #[allow(clippy::cast_precision_loss)]
                let value = (i as f64 * 7.3) % 100.0;
                SectorRecord::new(*id, GreenCover::new(value).unwrap())
            })
            .collect();

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert_eq!(
            summary.critical_zones.len() + summary.moderate_zones.len() + summary.good_zones.len(),
            records.len()
        );
        let bucket_total: usize = summary.breakdown.iter().map(|b| b.count).sum();
        assert_eq!(bucket_total, records.len());
    }

    #[test]
    fn threshold_boundaries_are_lower_inclusive() {
        let records = [record(1, 43.5), record(2, 52.0), record(3, 43.49)];

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert_eq!(numbers(&summary.critical_zones), vec![3]);
        assert_eq!(numbers(&summary.moderate_zones), vec![1]);
        assert_eq!(numbers(&summary.good_zones), vec![2]);
    }

    #[test]
    fn average_rounds_for_display_but_mean_keeps_precision() {
        let records = [record(1, 10.0), record(2, 10.0), record(3, 10.1)];

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert!((summary.mean - 10.033_333_333).abs() < 1e-6);
        assert!((summary.average - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn highest_takes_first_of_tied_maximum() {
        let records = [record(4, 80.0), record(5, 20.0), record(6, 80.0)];

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert_eq!(summary.highest.sector.number(), 4);
        assert_eq!(summary.lowest.sector.number(), 5);
    }

    #[test]
    fn single_record_is_both_highest_and_lowest() {
        let records = [record(8, 47.0)];

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert_eq!(summary.highest, summary.lowest);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn breakdown_shares() {
        let buckets = breakdown(3, 1, 0, 2);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].category, ZoneCategory::Critical);
        assert!((buckets[0].share - 33.3).abs() < f64::EPSILON);
        assert!((buckets[1].share - 0.0).abs() < f64::EPSILON);
        assert!((buckets[2].share - 66.7).abs() < f64::EPSILON);
    }

    #[test]
    fn performer_lists_are_capped() {
        let records: Vec<SectorRecord> = (1..=8).map(|n| record(n, f64::from(n) * 10.0)).collect();

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert_eq!(numbers(&summary.top_performers), vec![8, 7, 6, 5, 4]);
        assert_eq!(numbers(&summary.bottom_performers), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn performer_lists_keep_tie_order() {
        let records = [record(1, 40.0), record(2, 40.0), record(3, 90.0), record(4, 10.0)];

        let summary = summarize(&records, &ZoneThresholds::default()).unwrap();

        assert_eq!(numbers(&summary.top_performers), vec![3, 1, 2, 4]);
        assert_eq!(numbers(&summary.bottom_performers), vec![4, 2, 1, 3]);
        assert_eq!(summary.lowest, summary.bottom_performers[0]);
    }
}
