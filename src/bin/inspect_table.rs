use anyhow::Result;
use dststat::{
    fetch::{FetchOutcome, StatbankClient, TableSource},
    process::pivot_wide,
    tables::{self, TABLE_NAMES},
    Config,
};
use std::{env, process::exit};

#[tokio::main]
async fn main() -> Result<()> {
    dststat::init_logging();

    // Expect one CLI argument: a table name, plus an optional YAML config path.
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <TABLE> [CONFIG.yaml]", args[0]);
        eprintln!("Tables: {}", TABLE_NAMES.join(", "));
        exit(1);
    }
    let cfg = Config::load(args.get(2).map(std::path::Path::new))?;
    let Some(def) = tables::by_name(&args[1], cfg.first_year, cfg.current_year) else {
        eprintln!("Unknown table {}; expected one of {}", args[1], TABLE_NAMES.join(", "));
        exit(1);
    };

    // 1) The query as sent
    println!("=== {} ({}) ===", def.query.table, def.title);
    for var in &def.query.variables {
        println!("- {:<14} {}", var.code, var.values.join(","));
    }
    println!();

    // 2) Raw rows
    let client = StatbankClient::new(&cfg.api_url, cfg.request_timeout())?;
    let raw = match client.fetch_rows(&def.query).await {
        FetchOutcome::Rows(raw) => raw,
        FetchOutcome::NoData(reason) => {
            println!("No data: {}", reason);
            return Ok(());
        }
    };
    println!("=== Raw ===");
    println!("Rows:    {}", raw.len());
    println!("Headers: {}", raw.headers.join(";"));
    for row in raw.rows.iter().take(5) {
        println!("  {}", row.join(";"));
    }
    println!();

    // 3) Cleaned wide table
    let wide = pivot_wide(&raw, &def.pivot);
    println!(
        "=== Wide: {} years x {} columns ===",
        wide.years().len(),
        wide.columns().len()
    );
    print!("{}", wide);
    Ok(())
}
