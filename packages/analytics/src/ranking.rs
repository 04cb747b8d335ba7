//! Ordering of sectors by green cover.

use green_cover_sector_models::SectorRecord;

/// Returns the records sorted by green cover, highest first.
///
/// The sort is stable: records with equal green cover keep their input
/// order.
#[must_use]
pub fn rank_descending(records: &[SectorRecord]) -> Vec<SectorRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.value().total_cmp(&a.value()));
    ranked
}

/// The `n` best performers, highest first.
#[must_use]
pub fn top_performers(records: &[SectorRecord], n: usize) -> Vec<SectorRecord> {
    rank_descending(records).into_iter().take(n).collect()
}

/// The `n` worst performers, lowest first.
#[must_use]
pub fn bottom_performers(records: &[SectorRecord], n: usize) -> Vec<SectorRecord> {
    rank_descending(records).into_iter().rev().take(n).collect()
}
