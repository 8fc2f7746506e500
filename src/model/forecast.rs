use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use super::fit::{LineFit, PolynomialLeastSquares, TrendFitter};
use crate::table::{ForecastTable, WideTable};

/// Longest horizon a forecast will project; larger requests are capped.
pub const MAX_HORIZON: usize = 1000;

/// Horizon and post-fit clipping shared by every forecast variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastOptions {
    /// Number of future years to project.
    pub horizon: usize,
    /// Floor applied to each prediction after fitting.
    pub clip_min: Option<f64>,
}

impl ForecastOptions {
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            clip_min: None,
        }
    }

    pub fn clip_min(mut self, min: f64) -> Self {
        self.clip_min = Some(min);
        self
    }
}

/// Linear trend per column, fitted with the chosen strategy.
pub fn forecast_linear(table: &WideTable, opts: ForecastOptions, method: LineFit) -> ForecastTable {
    forecast_with(table, opts, method.fitter().as_ref())
}

/// Polynomial trend of `degree` per column (degree 0 is treated as 1).
pub fn forecast_poly(table: &WideTable, opts: ForecastOptions, degree: usize) -> ForecastTable {
    forecast_with(table, opts, &PolynomialLeastSquares::new(degree))
}

/// Project every column of `table` over the `opts.horizon` years after its last year.
///
/// Each column is fitted independently on its present, finite cells. A column
/// with fewer than `fitter.min_points()` such cells comes back entirely missing,
/// as does one whose points are degenerate (logged at warn). An empty source
/// gives an empty forecast. Horizons beyond [`MAX_HORIZON`] are capped.
#[instrument(level = "debug", skip(table, fitter), fields(columns = table.columns().len()))]
pub fn forecast_with(table: &WideTable, opts: ForecastOptions, fitter: &dyn TrendFitter) -> ForecastTable {
    let Some(last) = table.last_year() else {
        return WideTable::empty();
    };
    if opts.horizon > MAX_HORIZON {
        warn!(requested = opts.horizon, cap = MAX_HORIZON, "forecast horizon capped");
    }
    let future: Vec<i32> = (1..=opts.horizon.min(MAX_HORIZON))
        .map_while(|h| i32::try_from(h).ok().and_then(|h| last.checked_add(h)))
        .collect();

    let columns: BTreeMap<String, Vec<Option<f64>>> = table
        .iter_columns()
        .map(|(name, values)| {
            let points: Vec<(f64, f64)> = table
                .years()
                .iter()
                .zip(values)
                .filter_map(|(year, v)| v.filter(|v| v.is_finite()).map(|v| (*year as f64, v)))
                .collect();

            let predicted = if points.len() < fitter.min_points() {
                debug!(column = name, points = points.len(), "too few points; left missing");
                None
            } else {
                let trend = fitter.fit(&points);
                if trend.is_none() {
                    warn!(column = name, points = points.len(), "trend fit failed; left missing");
                }
                trend
            };

            let series = match predicted {
                Some(trend) => future
                    .iter()
                    .map(|year| {
                        let v = trend.eval(*year as f64);
                        Some(match opts.clip_min {
                            Some(min) => v.max(min),
                            None => v,
                        })
                    })
                    .collect(),
                None => vec![None; future.len()],
            };
            (name.to_string(), series)
        })
        .collect();

    WideTable::from_parts(future, columns)
}
