// src/process/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::{debug, trace};

pub mod period;
pub mod pivot;
pub mod raw_table;
pub mod utils;

pub use period::{Period, PeriodFilter, SubPeriod};
pub use pivot::{pivot_wide, DuplicatePolicy, PivotSpec};
pub use raw_table::RawTable;

/// Parse a `;`-separated API response body into a [`RawTable`].
///
/// The first record is the header row (`HERKOMST;TID;INDHOLD`, …). A leading
/// byte-order mark is ignored, fields are trimmed and unquoted, and records
/// with fewer fields than the header are kept as-is; the reshaper drops them
/// later if they lack a needed field.
pub fn parse_statbank_csv(body: &str) -> Result<RawTable> {
    let body = body.trim_start_matches('\u{feff}');
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| utils::clean_str(h).to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            trace!(idx, "skipping blank record");
            continue;
        }
        rows.push(record.iter().map(|f| utils::clean_str(f).to_string()).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "parsed CSV body");
    Ok(RawTable::new(headers, rows))
}
