use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use sinotick_core::{
    align_price_series, Adjustment, CalendarProvider, HistoryRequest, MarketDataSource,
    ProviderId, SourceCalendarProvider, Symbol,
};

use crate::cli::AlignArgs;
use crate::error::CliError;

use super::{elapsed_ms, parse_range, CommandResult, Providers};

pub async fn run(args: &AlignArgs, providers: &Providers) -> Result<CommandResult, CliError> {
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

    let mut warnings = Vec::new();
    if series.is_empty() {
        warnings.push(String::from(
            "no price rows in range; aligned output is all suspensions",
        ));
    }

    let aligned = align_price_series(&calendar, &series);
    let data = serde_json::to_value(&aligned)?;

    Ok(
        CommandResult::ok(data, vec![ProviderId::Sina, ProviderId::Eastmoney])
            .with_warnings(warnings)
            .with_latency(elapsed_ms(started)),
    )
}
