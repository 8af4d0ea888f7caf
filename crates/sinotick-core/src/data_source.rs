use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::align::DateRange;
use crate::calendar::TradingCalendar;
use crate::domain::{Adjustment, PriceSeries, QuarterTag, ReportRow, Symbol};
use crate::ProviderId;

/// Data endpoint type used for capability checks and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Calendar,
    DailyHistory,
    QuarterlyReports,
    Catalog,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::DailyHistory => "daily_history",
            Self::QuarterlyReports => "quarterly_reports",
            Self::Catalog => "catalog",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported endpoint matrix for a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub calendar: bool,
    pub daily_history: bool,
    pub quarterly_reports: bool,
    pub catalog: bool,
}

impl CapabilitySet {
    pub const fn new(
        calendar: bool,
        daily_history: bool,
        quarterly_reports: bool,
        catalog: bool,
    ) -> Self {
        Self {
            calendar,
            daily_history,
            quarterly_reports,
            catalog,
        }
    }

    pub const fn full() -> Self {
        Self::new(true, true, true, true)
    }

    pub const fn supports(self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Calendar => self.calendar,
            Endpoint::DailyHistory => self.daily_history,
            Endpoint::QuarterlyReports => self.quarterly_reports,
            Endpoint::Catalog => self.catalog,
        }
    }

    pub fn supported_endpoints(self) -> Vec<&'static str> {
        let mut values = Vec::with_capacity(4);
        if self.calendar {
            values.push("calendar");
        }
        if self.daily_history {
            values.push("daily_history");
        }
        if self.quarterly_reports {
            values.push("quarterly_reports");
        }
        if self.catalog {
            values.push("catalog");
        }
        values
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnsupportedEndpoint,
    Unavailable,
    RateLimited,
    InvalidRequest,
    MalformedPayload,
    Internal,
}

/// Structured source error carried back to the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unsupported_endpoint(endpoint: Endpoint) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedEndpoint,
            message: format!("endpoint '{endpoint}' is not supported by this source"),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedEndpoint => "source.unsupported_endpoint",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::MalformedPayload => "source.malformed_payload",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the daily-history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub range: DateRange,
    pub adjustment: Adjustment,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, range: DateRange, adjustment: Adjustment) -> Self {
        Self {
            symbol,
            range,
            adjustment,
        }
    }
}

/// Request payload for the quarterly-reports endpoint: one reporting period,
/// covering every listed security.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    pub period: QuarterTag,
}

impl ReportRequest {
    pub const fn new(period: QuarterTag) -> Self {
        Self { period }
    }
}

/// One entry of the listed-security catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub symbol: Symbol,
    pub name: String,
}

/// Source adapter contract.
///
/// An empty result and an unknown symbol are both "no data", not failures;
/// adapters reserve errors for transport and payload problems.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    fn id(&self) -> ProviderId;
    fn capabilities(&self) -> CapabilitySet;

    /// All trading dates the source knows about, unfiltered.
    async fn trading_calendar(&self) -> Result<TradingCalendar, SourceError>;

    async fn daily_history(&self, req: &HistoryRequest) -> Result<PriceSeries, SourceError>;

    async fn quarterly_reports(&self, req: &ReportRequest) -> Result<Vec<ReportRow>, SourceError>;

    async fn catalog(&self) -> Result<Vec<CatalogEntry>, SourceError>;
}
