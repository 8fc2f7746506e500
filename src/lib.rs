pub mod analyze;
pub mod config;
pub mod fetch;
pub mod model;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod table;
pub mod tables;

pub use config::Config;
pub use table::{ForecastTable, ShareTable, SummaryTable, WideTable};

/// Install the `tracing` subscriber used by the binaries (`RUST_LOG`, default `info`).
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}
