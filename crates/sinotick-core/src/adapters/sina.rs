//! Sina adapter: the historical trading-calendar feed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::calendar::TradingCalendar;
use crate::data_source::{
    CapabilitySet, CatalogEntry, Endpoint, HistoryRequest, MarketDataSource, ReportRequest,
    SourceError,
};
use crate::domain::{PriceSeries, ReportRow, TradeDate};
use crate::http_client::HttpClient;
use crate::ProviderId;

const CALENDAR_URL: &str = "https://finance.sina.com.cn/realstock/klc_td_sh.json";

/// Calendar-only source. The payload is the full known history of trading
/// dates as a JSON array; range filtering is the caller's job.
pub struct SinaCalendarAdapter {
    http: Arc<dyn HttpClient>,
}

impl SinaCalendarAdapter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MarketDataSource for SinaCalendarAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Sina
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(true, false, false, false)
    }

    async fn trading_calendar(&self) -> Result<TradingCalendar, SourceError> {
        let response = self
            .http
            .get(CALENDAR_URL)
            .await
            .map_err(|error| SourceError::unavailable(error.message().to_owned()))?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "sina returned HTTP {}",
                response.status
            )));
        }

        let raw: Vec<String> = serde_json::from_str(&response.body).map_err(|error| {
            SourceError::malformed_payload(format!("sina calendar did not parse: {error}"))
        })?;

        let dates = raw
            .iter()
            .map(|value| {
                TradeDate::parse(value).map_err(|_| {
                    SourceError::malformed_payload(format!(
                        "sina calendar date did not parse: '{value}'"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TradingCalendar::new(dates))
    }

    async fn daily_history(&self, _req: &HistoryRequest) -> Result<PriceSeries, SourceError> {
        Err(SourceError::unsupported_endpoint(Endpoint::DailyHistory))
    }

    async fn quarterly_reports(
        &self,
        _req: &ReportRequest,
    ) -> Result<Vec<ReportRow>, SourceError> {
        Err(SourceError::unsupported_endpoint(Endpoint::QuarterlyReports))
    }

    async fn catalog(&self) -> Result<Vec<CatalogEntry>, SourceError> {
        Err(SourceError::unsupported_endpoint(Endpoint::Catalog))
    }
}
