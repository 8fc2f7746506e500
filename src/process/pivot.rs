use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::process::period::PeriodFilter;
use crate::process::raw_table::RawTable;
use crate::process::utils::{non_missing, parse_value};
use crate::table::WideTable;

/// What to do when the same (year, category) cell is observed more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later raw row replaces the earlier one.
    #[default]
    LastWins,
    /// Average all observations of the cell.
    Mean,
}

/// Which raw columns become the index, the columns and the cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotSpec {
    pub period_field: String,
    pub category_field: String,
    pub value_field: String,
    pub period_filter: PeriodFilter,
    pub duplicates: DuplicatePolicy,
}

impl PivotSpec {
    /// Annual `TID` periods, `INDHOLD` values, last-wins duplicates.
    pub fn new(category_field: &str) -> Self {
        Self {
            period_field: "TID".into(),
            category_field: category_field.into(),
            value_field: "INDHOLD".into(),
            period_filter: PeriodFilter::Annual,
            duplicates: DuplicatePolicy::LastWins,
        }
    }

    pub fn with_period_filter(mut self, filter: PeriodFilter) -> Self {
        self.period_filter = filter;
        self
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    last: f64,
    sum: f64,
    count: usize,
}

/// Reshape a long table (one row per period × category) into a year-indexed wide table.
///
/// Rows with a missing period, category or value, and periods rejected by the
/// filter, are dropped before pivoting. Empty input, or a table lacking one of the
/// named columns, yields an empty table.
#[instrument(level = "debug", skip(raw, spec), fields(rows = raw.len(), category = %spec.category_field))]
pub fn pivot_wide(raw: &RawTable, spec: &PivotSpec) -> WideTable {
    if raw.is_empty() {
        return WideTable::empty();
    }

    let (Some(p_idx), Some(c_idx), Some(v_idx)) = (
        raw.column_index(&spec.period_field),
        raw.column_index(&spec.category_field),
        raw.column_index(&spec.value_field),
    ) else {
        warn!(
            headers = ?raw.headers,
            period = %spec.period_field,
            category = %spec.category_field,
            value = %spec.value_field,
            "raw table lacks a pivot column; nothing to reshape"
        );
        return WideTable::empty();
    };

    let mut slots: BTreeMap<i32, BTreeMap<String, Slot>> = BTreeMap::new();
    let mut dropped = 0usize;
    let mut duplicates = 0usize;

    for row in &raw.rows {
        let field = |i: usize| row.get(i).map(String::as_str);
        let year = field(p_idx)
            .and_then(non_missing)
            .and_then(|code| spec.period_filter.year_of(code));
        let category = field(c_idx).and_then(non_missing);
        let value = field(v_idx).and_then(parse_value);

        let (Some(year), Some(category), Some(value)) = (year, category, value) else {
            dropped += 1;
            continue;
        };

        let cell = slots
            .entry(year)
            .or_default()
            .entry(category.to_string())
            .or_insert(Slot {
                last: value,
                sum: 0.0,
                count: 0,
            });
        if cell.count > 0 {
            duplicates += 1;
        }
        cell.last = value;
        cell.sum += value;
        cell.count += 1;
    }

    let observations: BTreeMap<i32, BTreeMap<String, f64>> = slots
        .into_iter()
        .map(|(year, row)| {
            let row = row
                .into_iter()
                .map(|(category, slot)| {
                    let v = match spec.duplicates {
                        DuplicatePolicy::LastWins => slot.last,
                        DuplicatePolicy::Mean => slot.sum / slot.count as f64,
                    };
                    (category, v)
                })
                .collect();
            (year, row)
        })
        .collect();

    if duplicates > 0 {
        debug!(duplicates, policy = ?spec.duplicates, "collapsed duplicate cells");
    }
    debug!(years = observations.len(), dropped, "pivoted");

    WideTable::from_observations(&observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income_rows() -> RawTable {
        RawTable::from_strs(
            &["HERKOMST", "TID", "INDHOLD"],
            &[
                &["DANSK", "2016", "210000"],
                &["IND_VEST", "2015", "150000"],
                &["DANSK", "2015", "200000"],
                &["IND_VEST", "2016", "155000"],
            ],
        )
    }

    #[test]
    fn pivots_long_rows_into_sorted_wide_table() {
        let t = pivot_wide(&income_rows(), &PivotSpec::new("HERKOMST"));
        assert_eq!(t.years(), &[2015, 2016]);
        assert_eq!(t.columns(), &["DANSK".to_string(), "IND_VEST".to_string()]);
        assert_eq!(t.get(2015, "DANSK"), Some(200000.0));
        assert_eq!(t.get(2016, "IND_VEST"), Some(155000.0));
    }

    #[test]
    fn index_is_strictly_ascending_for_shuffled_input() {
        let raw = RawTable::from_strs(
            &["TID", "HERKOMST", "INDHOLD"],
            &[
                &["2020", "A", "1"],
                &["2011", "A", "2"],
                &["2017", "B", "3"],
                &["2011", "B", "4"],
                &["2020", "B", "5"],
            ],
        );
        let t = pivot_wide(&raw, &PivotSpec::new("HERKOMST"));
        assert_eq!(t.years(), &[2011, 2017, 2020]);
        assert!(t.years().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(t.get(2017, "A"), None);
    }

    #[test]
    fn single_category_round_trips() {
        let series = [(2001, 5.5), (2002, -1.0), (2005, 42.0)];
        let rows: Vec<Vec<String>> = series
            .iter()
            .map(|(y, v)| vec![y.to_string(), "ONLY".to_string(), v.to_string()])
            .collect();
        let raw = RawTable::new(vec!["TID".into(), "X".into(), "INDHOLD".into()], rows);

        let t = pivot_wide(&raw, &PivotSpec::new("X"));
        let back: Vec<(i32, f64)> = t
            .years()
            .iter()
            .zip(t.column("ONLY").unwrap())
            .map(|(y, v)| (*y, v.unwrap()))
            .collect();
        assert_eq!(back, series.to_vec());
    }

    #[test]
    fn duplicate_cells_last_wins_by_default() {
        let raw = RawTable::from_strs(
            &["TID", "HERKOMST", "INDHOLD"],
            &[&["2015", "A", "1"], &["2015", "A", "7"]],
        );
        let t = pivot_wide(&raw, &PivotSpec::new("HERKOMST"));
        assert_eq!(t.get(2015, "A"), Some(7.0));

        let mean = PivotSpec::new("HERKOMST").with_duplicates(DuplicatePolicy::Mean);
        assert_eq!(pivot_wide(&raw, &mean).get(2015, "A"), Some(4.0));
    }

    #[test]
    fn drops_incomplete_rows() {
        let raw = RawTable::from_strs(
            &["TID", "HERKOMST", "INDHOLD"],
            &[
                &["2015", "A", ".."],
                &["", "A", "3"],
                &["2016", "", "3"],
                &["2016", "A"],
                &["2017", "A", "9"],
            ],
        );
        let t = pivot_wide(&raw, &PivotSpec::new("HERKOMST"));
        assert_eq!(t.years(), &[2017]);
        assert_eq!(t.get(2017, "A"), Some(9.0));
    }

    #[test]
    fn quarter_filter_keeps_fourth_quarter_only() {
        let raw = RawTable::from_strs(
            &["IELAND", "TID", "INDHOLD"],
            &[
                &["5100", "2015K3", "10"],
                &["5100", "2015K4", "11"],
                &["5100", "2016K4", "12"],
                &["5122", "2016K4", "20"],
                &["5122", "2016K1", "99"],
            ],
        );
        let spec = PivotSpec::new("IELAND").with_period_filter(PeriodFilter::Quarter(4));
        let t = pivot_wide(&raw, &spec);
        assert_eq!(t.years(), &[2015, 2016]);
        assert_eq!(t.get(2015, "5100"), Some(11.0));
        assert_eq!(t.get(2016, "5122"), Some(20.0));
        assert_eq!(t.get(2015, "5122"), None);
    }

    #[test]
    fn empty_or_headerless_input_is_empty_table() {
        assert!(pivot_wide(&RawTable::default(), &PivotSpec::new("HERKOMST")).is_empty());

        let raw = RawTable::from_strs(&["TID", "INDHOLD"], &[&["2015", "1"]]);
        assert!(pivot_wide(&raw, &PivotSpec::new("HERKOMST")).is_empty());
    }
}
