use std::sync::Arc;
use std::time::Instant;

use sinotick_core::{
    align_reports_to_calendar, CalendarProvider, FetchPool, MarketDataSource, ProviderId,
    QuarterTag, ReportWindow, SourceCalendarProvider, Symbol,
};

use crate::cli::AsofArgs;
use crate::error::CliError;

use super::{elapsed_ms, parse_range, CommandResult, Providers};

pub async fn run(args: &AsofArgs, providers: &Providers) -> Result<CommandResult, CliError> {
    let started = Instant::now();

    let symbol = Symbol::parse(&args.symbol)?;
    let range = parse_range(&args.start, &args.end)?;

    let provider = SourceCalendarProvider::new(
        Arc::clone(&providers.sina) as Arc<dyn MarketDataSource>
    );
    let calendar = provider.trading_dates(range).await?;

    // A report announced inside the window can cover a quarter from the
    // prior year (a Q4 filing lands the following spring), so the fetch
    // reaches one year back.
    let periods = QuarterTag::sequence(range.start().year() - 1, range.end().year())?;
    let pool = FetchPool::new(args.workers);
    let rows = pool
        .fetch_reports(
            Arc::clone(&providers.eastmoney) as Arc<dyn MarketDataSource>,
            &periods,
        )
        .await;

    let aligned =
        align_reports_to_calendar(&calendar, &symbol, &rows, ReportWindow::Range(range))?;

    let mut warnings = Vec::new();
    if aligned.rows.iter().all(|row| row.report.is_none()) {
        warnings.push(format!("no report matched any trading date for {symbol}"));
    }

    let data = serde_json::to_value(&aligned)?;

    Ok(
        CommandResult::ok(data, vec![ProviderId::Sina, ProviderId::Eastmoney])
            .with_warnings(warnings)
            .with_latency(elapsed_ms(started)),
    )
}
