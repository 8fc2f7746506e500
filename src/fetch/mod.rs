// src/fetch/mod.rs

use std::fmt;

use crate::process::RawTable;

pub mod query;
pub mod statbank;

pub use query::{TableQuery, Variable};
pub use statbank::{StatbankClient, STATBANK_API};

/// Why a load produced nothing to work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDataReason {
    /// Network, HTTP status or body parsing failure.
    Transport(String),
    /// The API answered with zero rows.
    EmptyResponse,
    /// Rows arrived but none survived cleaning.
    EmptyAfterCleaning,
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataReason::Transport(e) => write!(f, "fetch failed: {}", e),
            NoDataReason::EmptyResponse => write!(f, "API returned no rows"),
            NoDataReason::EmptyAfterCleaning => write!(f, "no rows left after cleaning"),
        }
    }
}

/// Result of one table fetch. Failures are data, not errors: callers continue
/// with an empty table and report the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Rows(RawTable),
    NoData(NoDataReason),
}

/// The "fetch table rows" capability the pipeline depends on.
#[allow(async_fn_in_trait)]
pub trait TableSource {
    async fn fetch_rows(&self, query: &TableQuery) -> FetchOutcome;
}
