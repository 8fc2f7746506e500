// src/tables.rs
//
// Fixed Statbank tables and their dimension filters.

use crate::fetch::TableQuery;
use crate::process::{DuplicatePolicy, PeriodFilter, PivotSpec};

/// A table to load: how to query it and how to reshape it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Short name used on the command line.
    pub name: &'static str,
    pub title: &'static str,
    pub query: TableQuery,
    pub pivot: PivotSpec,
}

/// Names accepted by [`by_name`].
pub const TABLE_NAMES: &[&str] = &["folk1c", "indkp109", "indkp109_totals"];

const AGE_BANDS: &[&str] = &[
    "20-24", "25-29", "30-34", "35-39", "40-44", "45-49", "50-54", "55-59", "60-64", "65-69",
    "70-74", "75-79", "80-84", "85-89", "90-94", "95-99", "100OV",
];

const ANCESTRY: &[&str] = &["DANSK", "IND_VEST", "IND_ANDRE"];

/// FOLK1C: population on the first day of the quarter by region, sex, ancestry and
/// country of origin. Fourth-quarter counts for `first_year..current_year`, one column
/// per country of origin.
pub fn population(first_year: i32, current_year: i32) -> TableDef {
    TableDef {
        name: "folk1c",
        title: "Population by country of origin (Q4)",
        query: TableQuery::new("FOLK1C")
            .var("OMRÅDE", ["000"])
            .var("IELAND", ["*"])
            .var("HERKOMST", ["5", "4", "3"])
            .var("KØN", ["TOT"])
            .var("ALDER", AGE_BANDS.iter().copied())
            .var("TID", (first_year..current_year).map(|y| format!("{}K4", y))),
        pivot: PivotSpec::new("IELAND")
            .with_period_filter(PeriodFilter::Quarter(4))
            .with_duplicates(DuplicatePolicy::Mean),
    }
}

/// INDKP109: taxable income (type 105) in DKK per person (unit 121) by ancestry,
/// whole country, both sexes, all ages, for `first_year..current_year`.
pub fn income_per_person(first_year: i32, current_year: i32) -> TableDef {
    TableDef {
        name: "indkp109",
        title: "Average taxable income per person (DKK)",
        query: income_query("121")
            .var("tid", (first_year..current_year).map(|y| y.to_string())),
        pivot: PivotSpec::new("HERKOMST"),
    }
}

/// INDKP109 totals: the same breakdown in thousands of DKK (unit 110), through
/// `current_year` inclusive.
pub fn income_totals(first_year: i32, current_year: i32) -> TableDef {
    TableDef {
        name: "indkp109_totals",
        title: "Total taxable income (1000 DKK)",
        query: income_query("110")
            .var("TID", (first_year..=current_year).map(|y| y.to_string())),
        pivot: PivotSpec::new("HERKOMST"),
    }
}

fn income_query(unit: &str) -> TableQuery {
    TableQuery::new("INDKP109")
        .var("ALDER1", ["TOT"])
        .var("REGLAND", ["000"])
        .var("KOEN", ["MOK"])
        .var("HERKOMST", ANCESTRY.iter().copied())
        .var("INDKOMSTTYPE", ["105"])
        .var("ENHED", [unit])
}

/// Look up a table definition by its short name.
pub fn by_name(name: &str, first_year: i32, current_year: i32) -> Option<TableDef> {
    match name.to_ascii_lowercase().as_str() {
        "folk1c" => Some(population(first_year, current_year)),
        "indkp109" => Some(income_per_person(first_year, current_year)),
        "indkp109_totals" => Some(income_totals(first_year, current_year)),
        _ => None,
    }
}
