mod align;
mod asof;
mod calendar;
mod chart;
mod history;
mod reports;
mod sources;
mod store;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use uuid::Uuid;

use sinotick_core::{
    DateRange, EastmoneyAdapter, Envelope, EnvelopeError, EnvelopeMeta, HttpClient, ProviderId,
    ReqwestHttpClient, SinaCalendarAdapter, TradeDate,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

const SCHEMA_VERSION: &str = "v1.0.0";

/// Live provider set shared by every command.
pub struct Providers {
    pub eastmoney: Arc<EastmoneyAdapter>,
    pub sina: Arc<SinaCalendarAdapter>,
}

impl Providers {
    fn from_network() -> Self {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        Self {
            eastmoney: Arc::new(EastmoneyAdapter::new(Arc::clone(&http))),
            sina: Arc::new(SinaCalendarAdapter::new(http)),
        }
    }
}

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let providers = Providers::from_network();

    let result = match &cli.command {
        Command::Calendar(args) => calendar::run(args, &providers).await?,
        Command::History(args) => history::run(args, &providers).await?,
        Command::Reports(args) => reports::run(args, &providers).await?,
        Command::Align(args) => align::run(args, &providers).await?,
        Command::Asof(args) => asof::run(args, &providers).await?,
        Command::Chart(args) => chart::run(args, &providers).await?,
        Command::Sources(args) => sources::run(args, &providers)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
    } = result;

    let mut meta = EnvelopeMeta::new(
        Uuid::new_v4().to_string(),
        SCHEMA_VERSION,
        source_chain,
        latency_ms,
        false,
    )?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

pub(crate) fn parse_range(start: &str, end: &str) -> Result<DateRange, CliError> {
    let start = TradeDate::parse(start)?;
    let end = TradeDate::parse(end)?;
    DateRange::new(start, end).map_err(CliError::from)
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
