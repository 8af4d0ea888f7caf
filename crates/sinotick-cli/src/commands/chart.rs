use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use sinotick_core::{
    align_price_series, Adjustment, CalendarProvider, ChartSeries, HistoryRequest,
    MarketDataSource, ProviderId, SourceCalendarProvider, Symbol, DEFAULT_MA_WINDOWS,
};

use crate::cli::ChartArgs;
use crate::error::CliError;

use super::{elapsed_ms, parse_range, CommandResult, Providers};

pub async fn run(args: &ChartArgs, providers: &Providers) -> Result<CommandResult, CliError> {
    let started = Instant::now();

    let symbol = Symbol::parse(&args.symbol)?;
    let range = parse_range(&args.start, &args.end)?;
    let adjustment = Adjustment::from_str(&args.adjust)?;

    let provider = SourceCalendarProvider::new(
        Arc::clone(&providers.sina) as Arc<dyn MarketDataSource>
    );
    let calendar = provider.trading_dates(range).await?;

    let request = HistoryRequest::new(symbol, range, adjustment);
    let series = providers.eastmoney.daily_history(&request).await?;

    let aligned = align_price_series(&calendar, &series);
    let windows = if args.windows.is_empty() {
        DEFAULT_MA_WINDOWS.to_vec()
    } else {
        args.windows.clone()
    };
    let chart = ChartSeries::from_aligned(&aligned, &windows);

    let data = serde_json::to_value(&chart)?;

    Ok(
        CommandResult::ok(data, vec![ProviderId::Sina, ProviderId::Eastmoney])
            .with_latency(elapsed_ms(started)),
    )
}
