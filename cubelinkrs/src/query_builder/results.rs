//! Result alias back-mapping and pagination metadata.
//!
//! The engine labels result columns with the raw member addresses that
//! appeared in the statement; the surrounding layer expects its own aliases.
//! Pagination is approximated by over-fetching one row past the requested
//! page: an extra row proves more data exists but makes the exact total
//! unknowable.

use serde_json::{Map, Value};

use super::state::ResultAliasMap;

/// Outcome of a `read` call.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// The page of rows, alias-mapped, at most `limit` long.
    pub rows: Vec<Map<String, Value>>,
    /// Rows in this page.
    pub affected_rows: u64,
    pub has_more_rows: bool,
    /// `None` when more rows exist than were fetched; MDX has no cheap
    /// COUNT(*) equivalent to fall back on.
    pub total_row_count: Option<u64>,
}

/// Outcome of a `count` call. Same over-fetch strategy as `read`, no row
/// data.
#[derive(Debug, Clone, Copy)]
pub struct CountResult {
    pub has_more_rows: bool,
    /// Best-effort total (rows seen plus offset); `None` when the over-fetch
    /// proved more rows exist.
    pub total_row_count: Option<u64>,
}

/// Copy each physical column's value to every alias registered for it. The
/// physical column stays in the row.
pub fn apply_alias_map(rows: &mut [Map<String, Value>], alias_map: &ResultAliasMap) {
    if alias_map.is_empty() {
        return;
    }
    for row in rows.iter_mut() {
        for (physical, aliases) in alias_map {
            if let Some(value) = row.get(physical).cloned() {
                for alias in aliases {
                    row.insert(alias.clone(), value.clone());
                }
            }
        }
    }
}

/// Truncate the over-fetched row and derive the pagination metadata.
/// `limit` and `offset` are the caller's original window (not the
/// incremented fetch limit); `limit == 0` means unlimited.
pub fn paginate(mut rows: Vec<Map<String, Value>>, limit: u64, offset: u64) -> ReadResult {
    let fetched = rows.len() as u64;
    if limit > 0 && fetched > limit {
        rows.truncate(limit as usize);
        ReadResult {
            affected_rows: limit,
            has_more_rows: true,
            total_row_count: None,
            rows,
        }
    } else {
        ReadResult {
            affected_rows: fetched,
            has_more_rows: false,
            total_row_count: Some(fetched + offset),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Map<String, Value>> {
        (0..n)
            .map(|i| {
                let mut row = Map::new();
                row.insert("[Measures].[Sales]".to_string(), json!(i));
                row
            })
            .collect()
    }

    #[test]
    fn overfetched_page_truncates_and_loses_the_total() {
        let result = paginate(rows(11), 10, 20);
        assert_eq!(result.affected_rows, 10);
        assert_eq!(result.rows.len(), 10);
        assert!(result.has_more_rows);
        assert_eq!(result.total_row_count, None);
    }

    #[test]
    fn short_page_reports_exact_total() {
        let result = paginate(rows(7), 10, 20);
        assert_eq!(result.affected_rows, 7);
        assert!(!result.has_more_rows);
        assert_eq!(result.total_row_count, Some(27));
    }

    #[test]
    fn unlimited_read_counts_everything() {
        let result = paginate(rows(5), 0, 0);
        assert_eq!(result.affected_rows, 5);
        assert!(!result.has_more_rows);
        assert_eq!(result.total_row_count, Some(5));
    }

    #[test]
    fn alias_map_copies_values_and_keeps_the_physical_column() {
        let mut rows = rows(2);
        let mut alias_map = ResultAliasMap::new();
        alias_map.insert(
            "[Measures].[Sales]".to_string(),
            vec!["total_sales".to_string()],
        );
        apply_alias_map(&mut rows, &alias_map);
        for row in &rows {
            assert_eq!(row["total_sales"], row["[Measures].[Sales]"]);
        }
    }
}
