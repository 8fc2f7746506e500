//! Derived statistics over wide tables. Every function takes its parameters
//! explicitly and returns a new table.

pub mod summary;
pub mod trend;

pub use summary::{last_year_shares, last_year_summary};
pub use trend::{index_base, rolling_mean, yoy_change};
