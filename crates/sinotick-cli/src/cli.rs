//! CLI argument definitions for sinotick.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// A-share market data fetch and calendar-alignment CLI.
///
/// Pulls daily price history and quarterly performance reports for Chinese
/// A-share stocks and indexes, aligns them to the official trading calendar,
/// and prepares candlestick chart series. Data can optionally be kept in a
/// local DuckDB warehouse.
#[derive(Debug, Parser)]
#[command(name = "sinotick", version, about = "A-share market data & calendar alignment CLI")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Treat warnings as errors (non-zero exit).
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Trading dates between two dates, inclusive.
    Calendar(CalendarArgs),
    /// Daily price history for one or more symbols.
    History(HistoryArgs),
    /// Quarterly performance reports for a span of years.
    Reports(ReportsArgs),
    /// Calendar-aligned, gap-filled price table for one symbol.
    Align(AlignArgs),
    /// Backward as-of join of quarterly reports onto trading dates.
    Asof(AsofArgs),
    /// Candlestick chart series with moving-average overlays.
    Chart(ChartArgs),
    /// List data sources and their capabilities.
    Sources(SourcesArgs),
}

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Range start, YYYY-MM-DD or YYYYMMDD.
    pub start: String,
    /// Range end, inclusive.
    pub end: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Symbols: six-digit stock codes or zs.-prefixed indexes.
    #[arg(required = true)]
    pub symbols: Vec<String>,

    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub end: String,

    /// Price adjustment: qfq, hfq, or none.
    #[arg(long, default_value = "qfq")]
    pub adjust: String,

    /// Concurrent fetch workers.
    #[arg(long, default_value_t = 12)]
    pub workers: usize,

    /// Persist fetched bars to the local warehouse.
    #[arg(long)]
    pub store: bool,
}

#[derive(Debug, Args)]
pub struct ReportsArgs {
    /// First year of quarterly reports to fetch.
    #[arg(long)]
    pub start_year: i32,

    /// Last year, inclusive.
    #[arg(long)]
    pub end_year: i32,

    #[arg(long, default_value_t = 12)]
    pub workers: usize,

    /// Persist fetched reports to the local warehouse.
    #[arg(long)]
    pub store: bool,
}

#[derive(Debug, Args)]
pub struct AlignArgs {
    pub symbol: String,

    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub end: String,

    #[arg(long, default_value = "qfq")]
    pub adjust: String,
}

#[derive(Debug, Args)]
pub struct AsofArgs {
    pub symbol: String,

    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub end: String,

    /// Concurrent fetch workers for the per-quarter report pulls.
    #[arg(long, default_value_t = 12)]
    pub workers: usize,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    pub symbol: String,

    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub end: String,

    #[arg(long, default_value = "qfq")]
    pub adjust: String,

    /// Moving-average windows drawn over the candles.
    #[arg(long, value_delimiter = ',', default_values_t = [5, 10, 20])]
    pub windows: Vec<usize>,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {}
