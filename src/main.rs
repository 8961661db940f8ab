use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use replenishment_engine::filtering::{Query, SortKey};
use replenishment_engine::io::{demand, history, reporting};
use replenishment_engine::logging;
use replenishment_engine::{EngineConfig, ReplenishmentEngine, RunContext};
use std::path::PathBuf;

const REPORT_FILE: &str = "replenishment_report.csv";
const SUMMARY_FILE: &str = "replenishment_summary.json";

#[derive(Debug, Parser)]
#[command(name = "replenishment-engine")]
#[command(about = "Reorder and dead-stock recommendations from consumption history")]
struct Args {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stock items CSV; demo data is generated when omitted
    #[arg(long, requires = "history")]
    items: Option<PathBuf>,

    /// Consumption history CSV
    #[arg(long, requires = "items")]
    history: Option<PathBuf>,

    /// Last day of history to use (YYYY-MM-DD), today by default
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init();
    println!("=== Replenishment Engine ===");

    let today = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    // 1. SETUP CONFIGURATION
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let rounding = config.rounding.policy();

    // 2. LOAD OR GENERATE DATA
    let (items, consumption) = match (&args.items, &args.history) {
        (Some(items_path), Some(history_path)) => (
            history::load_stock_items(items_path)
                .with_context(|| format!("reading stock items from {}", items_path.display()))?,
            history::load_consumption(history_path)
                .with_context(|| format!("reading consumption from {}", history_path.display()))?,
        ),
        _ => {
            // Fixed seed so demo runs are comparable.
            let mut rng = StdRng::seed_from_u64(42);
            demand::demo_dataset("KITCHEN-1", config.history_window_days, today, &mut rng)
                .context("generating demo data")?
        }
    };
    println!(
        "Loaded {} items and {} consumption rows",
        items.len(),
        consumption.len()
    );

    // 3. RUN
    let engine = ReplenishmentEngine::new(config);
    let report = engine.run(&items, &consumption, &RunContext::new(today));

    // 4. PRESENT: biggest savings first
    let query = Query::default().sorted_by(SortKey::desc("projected_annual_savings"));
    let view = report.view(&query)?;
    let dead_stock = report.dead_stock_view(&Query::default().sorted_by(SortKey::desc("value_at_risk")))?;

    println!("\n=== Replenishment ===");
    for rec in &view.records {
        println!(
            "{:<10} {:<26} ROP {:>7.1} -> {:>7.1}  EOQ {:>7.1} -> {:>7.1}  ${:>9.2}  {:<6} {}",
            rec.code,
            rec.name,
            rec.current_rop,
            rounding.round_quantity(rec.recommended_rop),
            rec.current_eoq,
            rounding.round_quantity(rec.recommended_eoq),
            rec.projected_annual_savings,
            rec.risk_level,
            rec.action_type,
        );
    }
    println!(
        "Total projected savings: ${:.2} across {} items ({} to reorder now)",
        view.summary.total_savings, view.summary.count, view.summary.reorder_now
    );

    println!("\n=== Dead stock ===");
    for item in &dead_stock.records {
        println!(
            "{:<10} {:<26} value at risk ${:>9.2}  {}",
            item.code, item.name, item.value_at_risk, item.action
        );
    }
    println!("Total value at risk: ${:.2}", dead_stock.summary.total_value_at_risk);

    for failure in view.failures {
        eprintln!("Skipped {} @ {}: {}", failure.item_id, failure.location_id, failure.error);
    }

    // 5. EXPORT RESULTS
    reporting::write_recommendation_report(REPORT_FILE, &view.records, rounding.as_ref())?;
    reporting::write_summary_json(
        SUMMARY_FILE,
        &reporting::RunSummary {
            as_of: report.as_of,
            replenishment: &view.summary,
            dead_stock: &dead_stock.summary,
            failures: &report.failures,
        },
    )?;
    println!("\nSuccess! Data written to ./{REPORT_FILE} and ./{SUMMARY_FILE}");

    Ok(())
}
