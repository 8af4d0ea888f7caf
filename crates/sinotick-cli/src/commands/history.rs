use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Map, Value};

use sinotick_core::{Adjustment, FetchPool, MarketDataSource, ProviderId, Symbol};

use crate::cli::HistoryArgs;
use crate::error::CliError;

use super::{elapsed_ms, parse_range, store, CommandResult, Providers};

pub async fn run(args: &HistoryArgs, providers: &Providers) -> Result<CommandResult, CliError> {
    let started = Instant::now();

    let symbols = args
        .symbols
        .iter()
        .map(|symbol| Symbol::parse(symbol))
        .collect::<Result<Vec<_>, _>>()?;
    let range = parse_range(&args.start, &args.end)?;
    let adjustment = Adjustment::from_str(&args.adjust)?;

    let pool = FetchPool::new(args.workers);
    let fetched = pool
        .fetch_histories(
            Arc::clone(&providers.eastmoney) as Arc<dyn MarketDataSource>,
            &symbols,
            range,
            adjustment,
        )
        .await;

    let mut warnings: Vec<String> = symbols
        .iter()
        .filter(|symbol| !fetched.contains_key(symbol))
        .map(|symbol| format!("no data for {symbol}"))
        .collect();

    if args.store {
        match store::store_bars(&fetched) {
            Ok(stored) => tracing::info!(rows = stored, "bars stored to warehouse"),
            Err(error) => warnings.push(format!("warehouse sync (bars) failed: {error}")),
        }
    }

    let mut series = Map::new();
    for (symbol, value) in &fetched {
        series.insert(symbol.canonical(), serde_json::to_value(value)?);
    }

    let data = json!({
        "requested": symbols.len(),
        "fetched": fetched.len(),
        "adjustment": adjustment,
        "series": Value::Object(series),
    });

    Ok(CommandResult::ok(data, vec![ProviderId::Eastmoney])
        .with_warnings(warnings)
        .with_latency(elapsed_ms(started)))
}
