use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use sinotick_core::{FetchPool, MarketDataSource, ProviderId, QuarterTag};

use crate::cli::ReportsArgs;
use crate::error::CliError;

use super::{elapsed_ms, store, CommandResult, Providers};

pub async fn run(args: &ReportsArgs, providers: &Providers) -> Result<CommandResult, CliError> {
    let started = Instant::now();

    let periods = QuarterTag::sequence(args.start_year, args.end_year)?;
    let pool = FetchPool::new(args.workers);
    let rows = pool
        .fetch_reports(
            Arc::clone(&providers.eastmoney) as Arc<dyn MarketDataSource>,
            &periods,
        )
        .await;

    let mut warnings = Vec::new();
    if rows.is_empty() {
        warnings.push(format!(
            "no report rows for {}..{}",
            args.start_year, args.end_year
        ));
    }

    if args.store {
        match store::store_reports(&rows) {
            Ok(stored) => tracing::info!(rows = stored, "reports stored to warehouse"),
            Err(error) => warnings.push(format!("warehouse sync (reports) failed: {error}")),
        }
    }

    let data = json!({
        "periods": periods,
        "row_count": rows.len(),
        "reports": rows,
    });

    Ok(CommandResult::ok(data, vec![ProviderId::Eastmoney])
        .with_warnings(warnings)
        .with_latency(elapsed_ms(started)))
}
