pub mod fit;
pub mod forecast;

pub use fit::{ClosedFormLine, LineFit, PolynomialLeastSquares, Trend, TrendFitter};
pub use forecast::{forecast_linear, forecast_poly, forecast_with, ForecastOptions, MAX_HORIZON};
