//! Search-box filtering of sectors.
//!
//! A query that names a sector in any accepted form (`"Sector_5"`,
//! `"sector 5"`, `"5"`) matches exactly that sector. Any other query is
//! matched case-insensitively as a substring of the display name, with
//! `_`, `-` and `.` treated as spaces.

use green_cover_sector_models::SectorId;

/// Whether `sector` matches the search `query`. An empty query matches
/// everything.
#[must_use]
pub fn matches_query(sector: SectorId, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    if let Ok(named) = query.parse::<SectorId>() {
        return named == sector;
    }

    let needle = normalize_free_text(query);
    sector.display_name().to_lowercase().contains(&needle)
}

fn normalize_free_text(query: &str) -> String {
    query
        .to_lowercase()
        .replace(['_', '-', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(number: u16) -> SectorId {
        SectorId::new(number).unwrap()
    }

    #[test]
    fn empty_query_matches_all() {
        assert!(matches_query(id(1), ""));
        assert!(matches_query(id(1), "   "));
    }

    #[test]
    fn sector_name_query_matches_exactly() {
        assert!(matches_query(id(5), "Sector_5"));
        assert!(matches_query(id(5), "sector 5"));
        assert!(matches_query(id(5), "5"));
        assert!(!matches_query(id(15), "5"));
        assert!(!matches_query(id(50), "Sector 5"));
    }

    #[test]
    fn free_text_query_matches_substring() {
        assert!(matches_query(id(22), "SECT"));
        assert!(matches_query(id(22), "tor"));
        assert!(!matches_query(id(22), "block"));
    }

    #[test]
    fn catalog_filter_by_query() {
        let matching: Vec<u16> = SectorId::all()
            .iter()
            .filter(|s| matches_query(**s, "sector_10"))
            .map(|s| s.number())
            .collect();
        assert_eq!(matching, vec![10]);
    }
}
