//! Core contracts for sinotick.
//!
//! This crate contains:
//! - Canonical domain models and validation for A-share securities
//! - Trading-calendar access and the calendar/report alignment algorithms
//! - Provider/source identifiers, data source traits, and adapters
//! - The bounded fetch fan-out used for multi-symbol and multi-quarter pulls
//! - Response envelope and structured errors

pub mod adapters;
pub mod align;
pub mod calendar;
pub mod chart;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod pacing;
pub mod source;

pub use adapters::{EastmoneyAdapter, SinaCalendarAdapter};
pub use align::{
    align_price_series, align_reports_to_calendar, AlignError, DateRange, ReportWindow,
};
pub use calendar::{CalendarProvider, SourceCalendarProvider, TradingCalendar};
pub use chart::{Candle, ChartSeries, MovingAverage, DEFAULT_MA_WINDOWS};
pub use data_source::{
    CapabilitySet, CatalogEntry, Endpoint, HistoryRequest, MarketDataSource, ReportRequest,
    SourceError, SourceErrorKind,
};
pub use domain::{
    Adjustment, AlignedPriceRow, AlignedPriceSeries, AlignedReportRow, AlignedReportSeries,
    MatchedReport, PriceRow, PriceSeries, Quarter, QuarterTag, ReportFields, ReportRow,
    SecurityKind, Session, Symbol, TradeDate,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CoreError, ValidationError};
pub use fetch::FetchPool;
pub use http_client::{HttpClient, HttpError, HttpResponse, ReqwestHttpClient};
pub use pacing::RequestPacer;
pub use source::ProviderId;
