use tracing::warn;

use crate::table::WideTable;

/// Trailing moving average over `window` rows with min-periods 1.
///
/// Each cell averages the present values among itself and the `window - 1`
/// rows before it, so early rows are never missing for lack of history. A
/// cell is missing only when every value in its window is missing.
pub fn rolling_mean(table: &WideTable, window: usize) -> WideTable {
    let window = window.max(1);
    table.map_series(|_, values| {
        (0..values.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(window);
                let (sum, n) = values[start..=i]
                    .iter()
                    .flatten()
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                (n > 0).then(|| sum / n as f64)
            })
            .collect()
    })
}

/// Percent change between consecutive years: `(v[t] - v[t-1]) / v[t-1] * 100`.
///
/// The first row is always missing, as is any cell whose neighbour is missing
/// or whose previous value is zero.
pub fn yoy_change(table: &WideTable) -> WideTable {
    table.map_series(|_, values| {
        let mut out = Vec::with_capacity(values.len());
        out.extend(values.first().map(|_| None));
        out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
            (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev * 100.0),
            _ => None,
        }));
        out
    })
}

/// Rebase every column so `base_year` equals 100.
///
/// If `base_year` is not in the index the result keeps the table's shape with
/// every cell missing; a different year is never substituted. A column whose
/// base cell is missing or zero comes back missing.
pub fn index_base(table: &WideTable, base_year: i32) -> WideTable {
    if table.row(base_year).is_none() {
        warn!(base_year, "base year not in index; returning all-missing table");
        return table.all_missing();
    }

    table.map_series(|name, values| {
        let base = table.get(base_year, name).filter(|b| *b != 0.0);
        values
            .iter()
            .map(|v| match (v, base) {
                (Some(v), Some(b)) => Some(v / b * 100.0),
                _ => None,
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table(years: Vec<i32>, cols: &[(&str, Vec<Option<f64>>)]) -> WideTable {
        let cols = cols
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>();
        WideTable::new(years, cols).unwrap()
    }

    #[test]
    fn rolling_mean_on_constant_is_constant() {
        let t = table(vec![2015, 2016, 2017, 2018], &[("A", vec![Some(7.5); 4])]);
        for w in 1..6 {
            let r = rolling_mean(&t, w);
            assert_eq!(r.column("A").unwrap(), &[Some(7.5); 4][..]);
        }
    }

    #[test]
    fn rolling_mean_uses_available_history() {
        let t = table(
            vec![2015, 2016, 2017, 2018],
            &[("A", vec![Some(1.0), Some(2.0), None, Some(6.0)])],
        );
        let r = rolling_mean(&t, 3);
        assert_eq!(
            r.column("A").unwrap(),
            &[Some(1.0), Some(1.5), Some(1.5), Some(4.0)][..]
        );

        let gaps = table(vec![2015, 2016], &[("B", vec![None, None])]);
        assert_eq!(rolling_mean(&gaps, 3).column("B").unwrap(), &[None, None][..]);
    }

    #[test]
    fn yoy_first_row_missing_and_percent_changes() {
        let t = table(
            vec![2015, 2016, 2017],
            &[
                ("A", vec![Some(100.0), Some(110.0), Some(99.0)]),
                ("B", vec![Some(0.0), Some(5.0), None]),
            ],
        );
        let y = yoy_change(&t);
        let a = y.column("A").unwrap();
        assert_eq!(a[0], None);
        assert!((a[1].unwrap() - 10.0).abs() < 1e-9);
        assert!((a[2].unwrap() + 10.0).abs() < 1e-9);
        assert_eq!(y.column("B").unwrap(), &[None, None, None][..]);
        assert!(yoy_change(&WideTable::empty()).is_empty());
    }

    #[test]
    fn index_base_year_is_hundred() {
        let t = table(
            vec![2015, 2016, 2017],
            &[
                ("A", vec![Some(50.0), Some(75.0), Some(100.0)]),
                ("B", vec![Some(3.0), None, Some(6.0)]),
                ("C", vec![Some(1.0), None, Some(2.0)]),
            ],
        );
        let i = index_base(&t, 2015);
        assert_eq!(i.get(2015, "A"), Some(100.0));
        assert_eq!(i.get(2015, "B"), Some(100.0));
        assert_eq!(i.get(2017, "A"), Some(200.0));
        assert_eq!(i.get(2016, "B"), None);

        let j = index_base(&t, 2016);
        assert_eq!(j.get(2016, "A"), Some(100.0));
        assert_eq!(j.column("B").unwrap(), &[None, None, None][..]);
    }

    #[test]
    fn index_base_missing_year_is_all_missing() {
        let t = table(vec![2015, 2016], &[("A", vec![Some(1.0), Some(2.0)])]);
        let i = index_base(&t, 2010);
        assert_eq!(i.years(), t.years());
        assert_eq!(i.columns(), t.columns());
        assert_eq!(i.column("A").unwrap(), &[None, None][..]);
    }
}
