// src/pipeline.rs
//
// Fetch → clean → analyze/model → report, one table at a time.

use anyhow::Result;
use std::io::Write;
use tracing::{info, instrument, warn};

use crate::analyze::{index_base, last_year_shares, last_year_summary, rolling_mean, yoy_change};
use crate::config::Config;
use crate::fetch::{FetchOutcome, NoDataReason, TableSource};
use crate::model::{forecast_linear, forecast_poly};
use crate::process::pivot_wide;
use crate::report;
use crate::table::WideTable;
use crate::tables::{self, TableDef};

/// Whether a load produced data.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Ok { raw_rows: usize },
    NoData(NoDataReason),
}

/// A cleaned table together with how it came to be.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLoad {
    pub name: &'static str,
    pub status: LoadStatus,
    pub table: WideTable,
}

impl TableLoad {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, LoadStatus::Ok { .. })
    }
}

/// Fetch one table and reshape it. Never fails: any problem becomes `LoadStatus::NoData`
/// with an empty table.
#[instrument(level = "info", skip(source, def), fields(table = def.name))]
pub async fn load_table<S: TableSource>(source: &S, def: &TableDef) -> TableLoad {
    let (status, table) = match source.fetch_rows(&def.query).await {
        FetchOutcome::NoData(reason) => (LoadStatus::NoData(reason), WideTable::empty()),
        FetchOutcome::Rows(raw) => {
            let table = pivot_wide(&raw, &def.pivot);
            if table.is_empty() {
                (
                    LoadStatus::NoData(NoDataReason::EmptyAfterCleaning),
                    table,
                )
            } else {
                (LoadStatus::Ok { raw_rows: raw.len() }, table)
            }
        }
    };

    match &status {
        LoadStatus::Ok { raw_rows } => info!(
            raw_rows,
            years = table.years().len(),
            columns = table.columns().len(),
            "loaded"
        ),
        LoadStatus::NoData(reason) => warn!(%reason, "no data"),
    }

    TableLoad {
        name: def.name,
        status,
        table,
    }
}

/// Income per person by ancestry: summary, smoothing, growth, index, forecasts.
pub async fn income_report<S: TableSource>(source: &S, cfg: &Config, out: &mut impl Write) -> Result<LoadStatus> {
    let def = tables::income_per_person(cfg.first_year, cfg.current_year);
    let load = load_table(source, &def).await;
    if let LoadStatus::NoData(reason) = &load.status {
        writeln!(out, "No data for {}: {}", def.title, reason)?;
        return Ok(load.status);
    }
    let avg = &load.table;

    report::series_table(out, &avg.tail(cfg.preview_rows), def.title)?;
    report::summary_table(
        out,
        &last_year_summary(avg, &cfg.reference),
        "Last-year summary",
    )?;
    report::last_year_bars(out, avg, "Average income per person - last year", cfg.bar_width)?;
    report::grouped_bars(out, avg, "Average income per person by ancestry", cfg.bar_width)?;

    report::series_table(
        out,
        &rolling_mean(avg, cfg.rolling_window),
        &format!("{}-year rolling mean", cfg.rolling_window),
    )?;
    report::series_table(out, &yoy_change(avg), "Year-over-year change (%)")?;
    if let Some(base) = cfg.index_base_year.or_else(|| avg.years().first().copied()) {
        report::series_table(out, &index_base(avg, base), &format!("Index ({} = 100)", base))?;
    }

    for &horizon in &cfg.horizons {
        let fc = forecast_linear(avg, cfg.forecast_options(horizon), cfg.line_fit);
        report::history_with_forecast(
            out,
            avg,
            &fc,
            &format!("Average income - history + {}-year linear forecast", horizon),
        )?;
    }
    if let Some(&horizon) = cfg.horizons.first() {
        let fc = forecast_poly(avg, cfg.forecast_options(horizon), cfg.poly_degree);
        report::history_with_forecast(
            out,
            avg,
            &fc,
            &format!(
                "Average income - history + {}-year degree-{} forecast",
                horizon, cfg.poly_degree
            ),
        )?;
    }

    Ok(load.status)
}

/// Fourth-quarter population by country of origin.
pub async fn population_report<S: TableSource>(source: &S, cfg: &Config, out: &mut impl Write) -> Result<LoadStatus> {
    let def = tables::population(cfg.first_year, cfg.current_year);
    let load = load_table(source, &def).await;
    if let LoadStatus::NoData(reason) = &load.status {
        writeln!(out, "No data for {}: {}", def.title, reason)?;
        return Ok(load.status);
    }
    let pop = &load.table;

    report::series_table(out, &pop.tail(cfg.preview_rows), def.title)?;
    report::series_table(out, &yoy_change(pop), "Population change (%)")?;
    Ok(load.status)
}

/// Last-year composition of total taxable income by ancestry.
pub async fn income_share_report<S: TableSource>(source: &S, cfg: &Config, out: &mut impl Write) -> Result<LoadStatus> {
    let def = tables::income_totals(cfg.first_year, cfg.current_year);
    let load = load_table(source, &def).await;
    if let LoadStatus::NoData(reason) = &load.status {
        writeln!(out, "No data for {}: {}", def.title, reason)?;
        return Ok(load.status);
    }

    report::share_breakdown(
        out,
        &last_year_shares(&load.table),
        "Share of total taxable income",
        cfg.bar_width,
    )?;
    Ok(load.status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::TableQuery;
    use crate::process::RawTable;
    use std::collections::HashMap;

    /// Serves canned rows per table id.
    struct MemorySource {
        tables: HashMap<String, FetchOutcome>,
    }

    impl MemorySource {
        fn new(entries: Vec<(&str, FetchOutcome)>) -> Self {
            Self {
                tables: entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            }
        }
    }

    impl TableSource for MemorySource {
        async fn fetch_rows(&self, query: &TableQuery) -> FetchOutcome {
            self.tables
                .get(&query.table)
                .cloned()
                .unwrap_or(FetchOutcome::NoData(NoDataReason::EmptyResponse))
        }
    }

    fn scenario_rows() -> RawTable {
        RawTable::from_strs(
            &["HERKOMST", "TID", "INDHOLD"],
            &[
                &["DANSK", "2015", "200000"],
                &["IND_VEST", "2015", "150000"],
                &["DANSK", "2016", "210000"],
                &["IND_VEST", "2016", "155000"],
            ],
        )
    }

    fn config() -> Config {
        Config {
            first_year: 2015,
            current_year: 2017,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn end_to_end_income_scenario() {
        let source = MemorySource::new(vec![("INDKP109", FetchOutcome::Rows(scenario_rows()))]);
        let def = tables::income_per_person(2015, 2017);
        let load = load_table(&source, &def).await;

        assert_eq!(load.status, LoadStatus::Ok { raw_rows: 4 });
        assert_eq!(load.table.years(), &[2015, 2016]);
        assert_eq!(
            load.table.columns(),
            &["DANSK".to_string(), "IND_VEST".to_string()]
        );

        let summary = last_year_summary(&load.table, "DANSK");
        assert_eq!(summary.year, Some(2016));
        let dansk = summary.get("DANSK").unwrap();
        assert_eq!(
            (dansk.value, dansk.delta, dansk.ratio),
            (Some(210000.0), Some(0.0), Some(1.0))
        );
        let vest = summary.get("IND_VEST").unwrap();
        assert_eq!(vest.value, Some(155000.0));
        assert_eq!(vest.delta, Some(-55000.0));
        assert!((vest.ratio.unwrap() - 0.738).abs() < 1e-3);
    }

    #[tokio::test]
    async fn failed_fetch_and_empty_response_look_the_same_downstream() {
        let failed = MemorySource::new(vec![(
            "INDKP109",
            FetchOutcome::NoData(NoDataReason::Transport("connection refused".into())),
        )]);
        let empty = MemorySource::new(vec![]);
        let def = tables::income_per_person(2015, 2017);

        for source in [&failed, &empty] {
            let load = load_table(source, &def).await;
            assert!(!load.is_ok());
            assert!(load.table.is_empty());
        }
        assert_eq!(
            load_table(&empty, &def).await.status,
            LoadStatus::NoData(NoDataReason::EmptyResponse)
        );
    }

    #[tokio::test]
    async fn rows_that_do_not_survive_cleaning_are_no_data() {
        let raw = RawTable::from_strs(&["HERKOMST", "TID", "INDHOLD"], &[&["DANSK", "2016", ".."]]);
        let source = MemorySource::new(vec![("INDKP109", FetchOutcome::Rows(raw))]);
        let load = load_table(&source, &tables::income_per_person(2015, 2017)).await;
        assert_eq!(
            load.status,
            LoadStatus::NoData(NoDataReason::EmptyAfterCleaning)
        );
    }

    #[tokio::test]
    async fn income_report_renders_every_section() -> Result<()> {
        let source = MemorySource::new(vec![("INDKP109", FetchOutcome::Rows(scenario_rows()))]);
        let mut out = Vec::new();
        let status = income_report(&source, &config(), &mut out).await?;
        assert!(matches!(status, LoadStatus::Ok { .. }));

        let text = String::from_utf8(out)?;
        assert!(text.contains("Last-year summary"));
        assert!(text.contains("3-year rolling mean"));
        assert!(text.contains("Year-over-year change (%)"));
        assert!(text.contains("Index (2015 = 100)"));
        assert!(text.contains("2026 (fc)"));
        assert!(text.contains("2021 (fc)"));
        Ok(())
    }

    #[tokio::test]
    async fn reports_stop_quietly_without_data() -> Result<()> {
        let source = MemorySource::new(vec![]);
        let mut out = Vec::new();
        let cfg = config();
        income_report(&source, &cfg, &mut out).await?;
        population_report(&source, &cfg, &mut out).await?;
        income_share_report(&source, &cfg, &mut out).await?;

        let text = String::from_utf8(out)?;
        assert_eq!(text.matches("No data for").count(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn population_keeps_fourth_quarter() -> Result<()> {
        let raw = RawTable::from_strs(
            &["OMRÅDE", "IELAND", "HERKOMST", "TID", "INDHOLD"],
            &[
                &["000", "5100", "5", "2015K4", "100"],
                &["000", "5100", "4", "2015K4", "300"],
                &["000", "5100", "5", "2016K4", "120"],
                &["000", "5100", "5", "2016K3", "999"],
            ],
        );
        let source = MemorySource::new(vec![("FOLK1C", FetchOutcome::Rows(raw))]);
        let load = load_table(&source, &tables::population(2015, 2017)).await;
        assert_eq!(load.table.years(), &[2015, 2016]);
        assert_eq!(load.table.get(2015, "5100"), Some(200.0));
        assert_eq!(load.table.get(2016, "5100"), Some(120.0));

        let mut out = Vec::new();
        population_report(&source, &config(), &mut out).await?;
        assert!(String::from_utf8(out)?.contains("Population change (%)"));
        Ok(())
    }
}
