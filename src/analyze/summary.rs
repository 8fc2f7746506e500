use std::cmp::Ordering;
use tracing::warn;

use crate::table::{ShareRow, ShareTable, SummaryRow, SummaryTable, WideTable};

/// Compare every category in the table's last year against `reference`.
///
/// Rows are sorted by value, largest first, with missing values last. An empty
/// table gives an empty summary; an absent or missing reference leaves `delta`
/// and `ratio` missing for every row.
pub fn last_year_summary(table: &WideTable, reference: &str) -> SummaryTable {
    let Some(year) = table.last_year() else {
        warn!("no data to summarise");
        return SummaryTable {
            year: None,
            reference: reference.to_string(),
            rows: Vec::new(),
        };
    };

    let base = table.get(year, reference);
    if !table.has_column(reference) {
        warn!(reference, "reference category not in table");
    }

    let mut rows: Vec<SummaryRow> = table
        .row(year)
        .unwrap_or_default()
        .into_iter()
        .map(|(category, value)| {
            let (delta, ratio) = match (value, base) {
                (Some(v), Some(b)) => (Some(v - b), ratio(v, b)),
                _ => (None, None),
            };
            SummaryRow {
                category: category.to_string(),
                value,
                delta,
                ratio,
            }
        })
        .collect();

    rows.sort_by(|a, b| desc_missing_last(a.value, b.value));

    SummaryTable {
        year: Some(year),
        reference: reference.to_string(),
        rows,
    }
}

/// Each category's share of the last year's total, in percent.
///
/// Missing cells are left out of both the rows and the total. A total of zero
/// (or an empty table) gives an empty result.
pub fn last_year_shares(table: &WideTable) -> ShareTable {
    let Some(year) = table.last_year() else {
        return ShareTable::default();
    };

    let present: Vec<(&str, f64)> = table
        .row(year)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(category, v)| v.map(|v| (category, v)))
        .collect();
    let total: f64 = present.iter().map(|(_, v)| v).sum();
    if total == 0.0 {
        warn!(year, "row total is zero; no shares");
        return ShareTable {
            year: Some(year),
            rows: Vec::new(),
        };
    }

    let mut rows: Vec<ShareRow> = present
        .into_iter()
        .map(|(category, value)| ShareRow {
            category: category.to_string(),
            value,
            share_pct: value / total * 100.0,
        })
        .collect();
    rows.sort_by(|a, b| b.value.total_cmp(&a.value));

    ShareTable {
        year: Some(year),
        rows,
    }
}

fn ratio(v: f64, base: f64) -> Option<f64> {
    let r = v / base;
    r.is_finite().then_some(r)
}

fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
