//! Plain-text charts over the pipeline's output tables.
//!
//! Every renderer writes into any [`Write`] and treats empty input as
//! "nothing to draw": it logs a warning and returns `Ok(())`.

use anyhow::Result;
use std::io::Write;
use tracing::warn;

use crate::table::{ForecastTable, ShareTable, SummaryTable, WideTable};

pub mod chart;

use chart::{bar, fmt_opt, fmt_thousands, label_width};

/// One bar per category for the table's last year (missing cells skipped).
pub fn last_year_bars(out: &mut impl Write, table: &WideTable, title: &str, width: usize) -> Result<()> {
    let Some(year) = table.last_year() else {
        warn!(title, "no data to chart");
        return Ok(());
    };
    let mut values: Vec<(&str, f64)> = table
        .row(year)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(c, v)| v.map(|v| (c, v)))
        .collect();
    values.sort_by(|a, b| b.1.total_cmp(&a.1));

    writeln!(out, "{} ({})", title, year)?;
    draw_bars(out, &values, width, fmt_thousands)?;
    writeln!(out)?;
    Ok(())
}

/// A block of bars per year, one bar per category, on a shared scale.
pub fn grouped_bars(out: &mut impl Write, table: &WideTable, title: &str, width: usize) -> Result<()> {
    if table.is_empty() {
        warn!(title, "no data to chart");
        return Ok(());
    }
    let max = table
        .iter_columns()
        .flat_map(|(_, values)| values.iter().flatten().copied())
        .fold(0.0_f64, f64::max);
    let label = label_width(table.columns().iter().map(String::as_str));

    writeln!(out, "{}", title)?;
    for year in table.years() {
        writeln!(out, "{}", year)?;
        for (category, v) in table.row(*year).unwrap_or_default() {
            let drawn = v.map(|v| bar(v, max, width)).unwrap_or_default();
            writeln!(
                out,
                "  {:<label$} {:<width$} {}",
                category,
                drawn,
                fmt_opt(v),
                label = label,
                width = width
            )?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// History rows, a separator, then forecast rows marked `(fc)`.
///
/// An empty history draws nothing; an empty forecast draws the history alone.
pub fn history_with_forecast(
    out: &mut impl Write,
    history: &WideTable,
    forecast: &ForecastTable,
    title: &str,
) -> Result<()> {
    if history.is_empty() {
        warn!(title, "no history to chart");
        return Ok(());
    }

    writeln!(out, "{}", title)?;
    write!(out, "{:>10}", "TID")?;
    for c in history.columns() {
        write!(out, " {:>14}", c)?;
    }
    writeln!(out)?;

    let row = |out: &mut dyn Write, table: &WideTable, year: i32, tag: &str| -> Result<()> {
        write!(out, "{:>10}", format!("{}{}", year, tag))?;
        for c in history.columns() {
            write!(out, " {:>14}", fmt_opt(table.get(year, c)))?;
        }
        writeln!(out)?;
        Ok(())
    };

    for year in history.years() {
        row(&mut *out, history, *year, "")?;
    }
    if !forecast.is_empty() {
        writeln!(out, "{}", "-".repeat(10 + 15 * history.columns().len()))?;
        for year in forecast.years() {
            row(&mut *out, forecast, *year, " (fc)")?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// The last-year summary as a listing.
pub fn summary_table(out: &mut impl Write, summary: &SummaryTable, title: &str) -> Result<()> {
    if summary.is_empty() {
        warn!(title, "no summary to show");
        return Ok(());
    }
    writeln!(out, "{}", title)?;
    write!(out, "{}", summary)?;
    writeln!(out)?;
    Ok(())
}

/// Any derived wide table (rolling mean, YoY, index) as a plain listing.
pub fn series_table(out: &mut impl Write, table: &WideTable, title: &str) -> Result<()> {
    if table.is_empty() {
        warn!(title, "no data to show");
        return Ok(());
    }
    writeln!(out, "{}", title)?;
    write!(out, "{}", table)?;
    writeln!(out)?;
    Ok(())
}

/// Percentage bars standing in for a pie chart of the last year's composition.
pub fn share_breakdown(out: &mut impl Write, shares: &ShareTable, title: &str, width: usize) -> Result<()> {
    let (Some(year), false) = (shares.year, shares.is_empty()) else {
        warn!(title, "no data to chart");
        return Ok(());
    };
    let values: Vec<(&str, f64)> = shares
        .rows
        .iter()
        .map(|r| (r.category.as_str(), r.share_pct))
        .collect();

    writeln!(out, "{} ({})", title, year)?;
    draw_bars(out, &values, width, |v| format!("{:.1}%", v))?;
    writeln!(out)?;
    Ok(())
}

fn draw_bars(
    out: &mut impl Write,
    values: &[(&str, f64)],
    width: usize,
    fmt: impl Fn(f64) -> String,
) -> Result<()> {
    let max = values.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label = label_width(values.iter().map(|(c, _)| *c));
    for (category, v) in values {
        writeln!(
            out,
            "{:<label$} {:<width$} {}",
            category,
            bar(*v, max, width),
            fmt(*v),
            label = label,
            width = width
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{last_year_shares, last_year_summary};
    use std::collections::BTreeMap;

    fn income() -> WideTable {
        WideTable::new(
            vec![2015, 2016],
            BTreeMap::from([
                ("DANSK".to_string(), vec![Some(200000.0), Some(210000.0)]),
                ("IND_VEST".to_string(), vec![Some(150000.0), Some(155000.0)]),
            ]),
        )
        .unwrap()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_inputs_draw_nothing() {
        let empty = WideTable::empty();
        assert_eq!(render(|o| last_year_bars(o, &empty, "t", 10)), "");
        assert_eq!(render(|o| grouped_bars(o, &empty, "t", 10)), "");
        assert_eq!(render(|o| history_with_forecast(o, &empty, &income(), "t")), "");
        assert_eq!(render(|o| summary_table(o, &SummaryTable::default(), "t")), "");
        assert_eq!(render(|o| series_table(o, &empty, "t")), "");
        assert_eq!(render(|o| share_breakdown(o, &ShareTable::default(), "t", 10)), "");
    }

    #[test]
    fn last_year_bars_lists_largest_first() {
        let s = render(|o| last_year_bars(o, &income(), "Income", 10));
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "Income (2016)");
        assert!(lines[1].starts_with("DANSK"));
        assert!(lines[1].ends_with("210,000"));
        assert!(lines[2].starts_with("IND_VEST"));
        assert!(lines[2].contains('█'));
    }

    #[test]
    fn history_then_forecast() {
        let fc = WideTable::new(
            vec![2017],
            BTreeMap::from([
                ("DANSK".to_string(), vec![Some(220000.0)]),
                ("IND_VEST".to_string(), vec![None]),
            ]),
        )
        .unwrap();
        let s = render(|o| history_with_forecast(o, &income(), &fc, "History"));
        assert!(s.contains("2017 (fc)"));
        assert!(s.contains("220,000"));
        assert!(s.contains("NaN"));
        let sep = s.lines().position(|l| l.starts_with("---")).unwrap();
        let fc_line = s.lines().position(|l| l.contains("(fc)")).unwrap();
        assert!(sep < fc_line);

        let only_history = render(|o| history_with_forecast(o, &income(), &WideTable::empty(), "H"));
        assert!(!only_history.contains("(fc)"));
    }

    #[test]
    fn summary_and_shares_render() {
        let s = render(|o| summary_table(o, &last_year_summary(&income(), "DANSK"), "Summary"));
        assert!(s.contains("delta_vs_DANSK"));
        assert!(s.contains("-55000.00"));

        let p = render(|o| share_breakdown(o, &last_year_shares(&income()), "Shares", 20));
        assert!(p.starts_with("Shares (2016)"));
        assert!(p.contains('%'));
    }
}
