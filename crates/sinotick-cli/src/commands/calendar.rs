use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use sinotick_core::{CalendarProvider, MarketDataSource, ProviderId, SourceCalendarProvider};

use crate::cli::CalendarArgs;
use crate::error::CliError;

use super::{elapsed_ms, parse_range, CommandResult, Providers};

pub async fn run(args: &CalendarArgs, providers: &Providers) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let range = parse_range(&args.start, &args.end)?;

    let provider = SourceCalendarProvider::new(
        Arc::clone(&providers.sina) as Arc<dyn MarketDataSource>
    );
    let calendar = provider.trading_dates(range).await?;

    let data = json!({
        "start": range.start(),
        "end": range.end(),
        "count": calendar.len(),
        "dates": calendar,
    });

    Ok(CommandResult::ok(data, vec![ProviderId::Sina]).with_latency(elapsed_ms(started)))
}
