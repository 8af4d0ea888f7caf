//! Trading-calendar access.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::align::DateRange;
use crate::data_source::{MarketDataSource, SourceError};
use crate::domain::TradeDate;

/// Ordered, duplicate-free set of exchange trading dates.
///
/// The constructor normalizes arbitrary input (unsorted, with duplicates)
/// rather than assuming a clean provider payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradingCalendar {
    dates: Vec<TradeDate>,
}

impl TradingCalendar {
    pub fn new(mut dates: Vec<TradeDate>) -> Self {
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<TradeDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<TradeDate> {
        self.dates.last().copied()
    }

    pub fn dates(&self) -> &[TradeDate] {
        &self.dates
    }

    pub fn iter(&self) -> impl Iterator<Item = TradeDate> + '_ {
        self.dates.iter().copied()
    }

    pub fn contains(&self, date: TradeDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    /// Dates falling inside the inclusive range.
    pub fn between(&self, range: DateRange) -> Self {
        let start = self.dates.partition_point(|date| *date < range.start());
        let end = self.dates.partition_point(|date| *date <= range.end());
        Self {
            dates: self.dates[start..end].to_vec(),
        }
    }
}

impl FromIterator<TradeDate> for TradingCalendar {
    fn from_iter<I: IntoIterator<Item = TradeDate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Supplies the trading dates within an inclusive range.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn trading_dates(&self, range: DateRange) -> Result<TradingCalendar, SourceError>;
}

/// Calendar provider backed by a market data source.
///
/// The source is a black box returning all trading dates it knows about;
/// range filtering happens here, not in the adapter.
pub struct SourceCalendarProvider {
    source: Arc<dyn MarketDataSource>,
}

impl SourceCalendarProvider {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl CalendarProvider for SourceCalendarProvider {
    async fn trading_dates(&self, range: DateRange) -> Result<TradingCalendar, SourceError> {
        let full = self.source.trading_calendar().await?;
        Ok(full.between(range))
    }
}
