//! Eastmoney adapter: daily kline history, quarterly performance reports,
//! and the listed-security catalog.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::calendar::TradingCalendar;
use crate::data_source::{
    CapabilitySet, CatalogEntry, Endpoint, HistoryRequest, MarketDataSource, ReportRequest,
    SourceError,
};
use crate::domain::{
    Adjustment, PriceRow, PriceSeries, ReportFields, ReportRow, Symbol, TradeDate,
};
use crate::http_client::{HttpClient, HttpError};
use crate::pacing::RequestPacer;
use crate::ProviderId;

const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
const REPORT_URL: &str = "https://datacenter-web.eastmoney.com/api/data/v1/get";
const CATALOG_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";

const KLINE_FIELDS: &str = "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61";
const DAILY_PERIOD: &str = "101";
const REPORT_PAGE_SIZE: usize = 500;
// Mainboard + ChiNext + STAR market share listings.
const CATALOG_FILTER: &str = "m:0+t:6,m:0+t:80,m:1+t:2,m:1+t:23";

pub struct EastmoneyAdapter {
    http: Arc<dyn HttpClient>,
    pacer: RequestPacer,
}

impl EastmoneyAdapter {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            pacer: RequestPacer::default(),
        }
    }

    pub fn with_pacer(http: Arc<dyn HttpClient>, pacer: RequestPacer) -> Self {
        Self { http, pacer }
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, SourceError>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.pacer.acquire().await;

        let response = self.http.get(url).await.map_err(http_to_source)?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "eastmoney returned HTTP {}",
                response.status
            )));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            SourceError::malformed_payload(format!("eastmoney payload did not parse: {error}"))
        })
    }
}

#[async_trait]
impl MarketDataSource for EastmoneyAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Eastmoney
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(false, true, true, true)
    }

    async fn trading_calendar(&self) -> Result<TradingCalendar, SourceError> {
        Err(SourceError::unsupported_endpoint(Endpoint::Calendar))
    }

    async fn daily_history(&self, req: &HistoryRequest) -> Result<PriceSeries, SourceError> {
        let url = format!(
            "{KLINE_URL}?secid={secid}&klt={DAILY_PERIOD}&fqt={fqt}&beg={beg}&end={end}\
             &fields1=f1,f2,f3,f4,f5,f6&fields2={KLINE_FIELDS}",
            secid = req.symbol.secid(),
            fqt = adjustment_code(req.adjustment),
            beg = req.range.start().format_compact(),
            end = req.range.end().format_compact(),
        );

        let envelope: KlineEnvelope = self.get_json(&url).await?;

        // A null data block means the symbol is unknown or has no bars in
        // range; both are "no data".
        let klines = envelope
            .data
            .and_then(|payload| payload.klines)
            .unwrap_or_default();

        let rows = klines
            .iter()
            .map(|line| parse_kline(line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PriceSeries::new(req.symbol.clone(), rows))
    }

    async fn quarterly_reports(&self, req: &ReportRequest) -> Result<Vec<ReportRow>, SourceError> {
        let filter = format!("(REPORTDATE='{}')", req.period.report_date().format_dashed());
        let encoded_filter = urlencoding::encode(&filter);

        let mut rows = Vec::new();
        let mut page = 1usize;

        loop {
            let url = format!(
                "{REPORT_URL}?reportName=RPT_LICO_FN_CPD&columns=ALL&filter={encoded_filter}\
                 &pageNumber={page}&pageSize={REPORT_PAGE_SIZE}\
                 &sortColumns=NOTICE_DATE%2CSECURITY_CODE&sortTypes=-1%2C1&source=WEB&client=WEB",
            );

            let envelope: ReportEnvelope = self.get_json(&url).await?;

            // success=false with no result is the provider's "no rows for
            // this period" shape, common before a reporting season opens.
            let Some(result) = envelope.result else {
                return Ok(rows);
            };

            for raw in &result.data {
                if let Some(row) = normalize_report(raw, req) {
                    rows.push(row);
                }
            }

            if page >= result.pages.max(1) {
                return Ok(rows);
            }
            page += 1;
        }
    }

    async fn catalog(&self) -> Result<Vec<CatalogEntry>, SourceError> {
        let url = format!(
            "{CATALOG_URL}?pn=1&pz=10000&po=1&np=1&fltt=2&invt=2&fid=f12\
             &fs={fs}&fields=f12,f14",
            fs = urlencoding::encode(CATALOG_FILTER),
        );

        let envelope: CatalogEnvelope = self.get_json(&url).await?;
        let listings = envelope
            .data
            .map(|payload| payload.diff)
            .unwrap_or_default();

        Ok(listings
            .into_iter()
            .filter_map(|listing| {
                let symbol = Symbol::parse(&listing.code).ok()?;
                Some(CatalogEntry {
                    symbol,
                    name: listing.name,
                })
            })
            .collect())
    }
}

const fn adjustment_code(adjustment: Adjustment) -> &'static str {
    match adjustment {
        Adjustment::None => "0",
        Adjustment::Forward => "1",
        Adjustment::Backward => "2",
    }
}

fn http_to_source(error: HttpError) -> SourceError {
    if error.retryable() {
        SourceError::unavailable(error.message().to_owned())
    } else {
        SourceError::internal(error.message().to_owned())
    }
}

#[derive(Debug, Deserialize)]
struct KlineEnvelope {
    data: Option<KlinePayload>,
}

#[derive(Debug, Deserialize)]
struct KlinePayload {
    klines: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ReportEnvelope {
    result: Option<ReportResult>,
}

#[derive(Debug, Deserialize)]
struct ReportResult {
    #[serde(default)]
    pages: usize,
    #[serde(default)]
    data: Vec<RawReport>,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    #[serde(rename = "SECURITY_CODE")]
    security_code: String,
    #[serde(rename = "NOTICE_DATE")]
    notice_date: Option<String>,
    #[serde(rename = "BASIC_EPS")]
    basic_eps: Option<f64>,
    #[serde(rename = "TOTAL_OPERATE_INCOME")]
    total_operate_income: Option<f64>,
    #[serde(rename = "YSTZ")]
    revenue_yoy: Option<f64>,
    #[serde(rename = "PARENT_NETPROFIT")]
    parent_netprofit: Option<f64>,
    #[serde(rename = "SJLTZ")]
    net_profit_yoy: Option<f64>,
    #[serde(rename = "BPS")]
    bps: Option<f64>,
    #[serde(rename = "WEIGHTAVG_ROE")]
    weightavg_roe: Option<f64>,
    #[serde(rename = "MGJYXJJE")]
    cash_flow_per_share: Option<f64>,
    #[serde(rename = "XSMLL")]
    gross_margin: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    data: Option<CatalogPayload>,
}

#[derive(Debug, Deserialize)]
struct CatalogPayload {
    #[serde(default)]
    diff: Vec<RawListing>,
}

#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(rename = "f12")]
    code: String,
    #[serde(rename = "f14")]
    name: String,
}

/// One kline line is `date,open,close,high,low,volume,amount,swing,
/// pct_chg,change,turnover`, the field order requested via `fields2`.
fn parse_kline(line: &str) -> Result<PriceRow, SourceError> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != 11 {
        return Err(SourceError::malformed_payload(format!(
            "kline has {} fields, expected 11: '{line}'",
            parts.len()
        )));
    }

    let date = TradeDate::parse(parts[0]).map_err(|_| {
        SourceError::malformed_payload(format!("kline date did not parse: '{}'", parts[0]))
    })?;

    Ok(PriceRow {
        date,
        open: parse_field(parts[1]),
        close: parse_field(parts[2]),
        high: parse_field(parts[3]),
        low: parse_field(parts[4]),
        volume: parse_field(parts[5]),
        amount: parse_field(parts[6]),
        swing: parse_field(parts[7]),
        pct_chg: parse_field(parts[8]),
        change: parse_field(parts[9]),
        turnover: parse_field(parts[10]),
    })
}

/// Providers mark absent numbers with `-` or an empty field.
fn parse_field(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    trimmed.parse().ok()
}

fn normalize_report(raw: &RawReport, req: &ReportRequest) -> Option<ReportRow> {
    let symbol = Symbol::parse(&raw.security_code).ok()?;
    // NOTICE_DATE arrives as '2021-04-29 00:00:00'; the date part is enough.
    let notice = raw.notice_date.as_deref()?;
    let announced = TradeDate::parse(notice.split_whitespace().next()?).ok()?;

    Some(ReportRow {
        symbol,
        announced,
        period: req.period,
        fields: ReportFields {
            eps: raw.basic_eps,
            revenue: raw.total_operate_income,
            revenue_yoy: raw.revenue_yoy,
            net_profit: raw.parent_netprofit,
            net_profit_yoy: raw.net_profit_yoy,
            bps: raw.bps,
            roe: raw.weightavg_roe,
            cash_flow_per_share: raw.cash_flow_per_share,
            gross_margin: raw.gross_margin,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::DateRange;
    use crate::domain::{Quarter, QuarterTag};
    use crate::http_client::{HttpResponse, ReplayHttpClient};

    fn date(value: &str) -> TradeDate {
        TradeDate::parse(value).expect("test date must parse")
    }

    fn history_request() -> HistoryRequest {
        HistoryRequest::new(
            Symbol::parse("600519").expect("valid symbol"),
            DateRange::new(date("2021-01-01"), date("2021-01-31")).expect("valid range"),
            Adjustment::Forward,
        )
    }

    #[tokio::test]
    async fn daily_history_parses_klines_in_provider_order() {
        let body = r#"{
            "data": {
                "code": "600519",
                "klines": [
                    "2021-01-04,1997.00,2000.50,2009.00,1982.00,46956.0,9380000000.0,1.35,0.45,9.0,0.37",
                    "2021-01-05,2001.00,2010.00,2015.00,1995.50,38120.0,7650000000.0,0.97,0.47,9.5,0.30"
                ]
            }
        }"#;
        let http = Arc::new(ReplayHttpClient::new([HttpResponse::ok_json(body)]));
        let adapter = EastmoneyAdapter::new(http.clone());

        let series = adapter
            .daily_history(&history_request())
            .await
            .expect("history must parse");

        assert_eq!(series.rows.len(), 2);
        let first = &series.rows[0];
        assert_eq!(first.date, date("2021-01-04"));
        assert_eq!(first.open, Some(1997.00));
        assert_eq!(first.close, Some(2000.50));
        assert_eq!(first.high, Some(2009.00));
        assert_eq!(first.low, Some(1982.00));
        assert_eq!(first.turnover, Some(0.37));

        let url = &http.requested()[0];
        assert!(url.contains("secid=1.600519"));
        assert!(url.contains("fqt=1"));
        assert!(url.contains("beg=20210101"));
    }

    #[tokio::test]
    async fn daily_history_treats_null_data_as_empty() {
        let http = Arc::new(ReplayHttpClient::new([HttpResponse::ok_json(
            r#"{"data": null}"#,
        )]));
        let adapter = EastmoneyAdapter::new(http);

        let series = adapter
            .daily_history(&history_request())
            .await
            .expect("null data is no data, not an error");
        assert!(series.rows.is_empty());
    }

    #[tokio::test]
    async fn daily_history_rejects_short_kline() {
        let http = Arc::new(ReplayHttpClient::new([HttpResponse::ok_json(
            r#"{"data": {"code": "600519", "klines": ["2021-01-04,1.0,2.0"]}}"#,
        )]));
        let adapter = EastmoneyAdapter::new(http);

        let err = adapter
            .daily_history(&history_request())
            .await
            .expect_err("truncated kline must fail");
        assert_eq!(err.code(), "source.malformed_payload");
    }

    #[tokio::test]
    async fn reports_paginate_and_normalize_notice_dates() {
        let page_one = r#"{
            "result": {
                "pages": 2,
                "data": [{
                    "SECURITY_CODE": "600519",
                    "NOTICE_DATE": "2021-04-29 00:00:00",
                    "BASIC_EPS": 3.25,
                    "TOTAL_OPERATE_INCOME": 27000000000.0,
                    "YSTZ": 11.7,
                    "PARENT_NETPROFIT": 13900000000.0,
                    "SJLTZ": 6.57,
                    "BPS": 131.0,
                    "WEIGHTAVG_ROE": 8.2,
                    "MGJYXJJE": 1.2,
                    "XSMLL": 91.6
                }]
            }
        }"#;
        let page_two = r#"{
            "result": {
                "pages": 2,
                "data": [{
                    "SECURITY_CODE": "000858",
                    "NOTICE_DATE": "2021-04-28 00:00:00",
                    "BASIC_EPS": 1.02
                }]
            }
        }"#;
        let http = Arc::new(ReplayHttpClient::new([
            HttpResponse::ok_json(page_one),
            HttpResponse::ok_json(page_two),
        ]));
        let adapter = EastmoneyAdapter::new(http.clone());
        let request = ReportRequest::new(QuarterTag::new(2021, Quarter::Q1));

        let rows = adapter
            .quarterly_reports(&request)
            .await
            .expect("reports must parse");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol.code(), "600519");
        assert_eq!(rows[0].announced, date("2021-04-29"));
        assert_eq!(rows[0].period, QuarterTag::new(2021, Quarter::Q1));
        assert_eq!(rows[0].fields.roe, Some(8.2));
        assert_eq!(rows[1].fields.eps, Some(1.02));
        assert_eq!(rows[1].fields.revenue, None);

        let urls = http.requested();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("pageNumber=1"));
        assert!(urls[1].contains("pageNumber=2"));
        assert!(urls[0].contains(&*urlencoding::encode("(REPORTDATE='2021-03-31')")));
    }

    #[tokio::test]
    async fn reports_with_missing_result_are_empty() {
        let http = Arc::new(ReplayHttpClient::new([HttpResponse::ok_json(
            r#"{"success": false, "result": null}"#,
        )]));
        let adapter = EastmoneyAdapter::new(http);
        let request = ReportRequest::new(QuarterTag::new(1989, Quarter::Q1));

        let rows = adapter
            .quarterly_reports(&request)
            .await
            .expect("no rows is not an error");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn catalog_skips_unparseable_codes() {
        let body = r#"{
            "data": {
                "total": 2,
                "diff": [
                    {"f12": "600519", "f14": "贵州茅台"},
                    {"f12": "BK0475", "f14": "板块"}
                ]
            }
        }"#;
        let http = Arc::new(ReplayHttpClient::new([HttpResponse::ok_json(body)]));
        let adapter = EastmoneyAdapter::new(http);

        let listings = adapter.catalog().await.expect("catalog must parse");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].symbol.code(), "600519");
        assert_eq!(listings[0].name, "贵州茅台");
    }

    #[tokio::test]
    async fn http_failure_maps_to_unavailable() {
        let http = Arc::new(ReplayHttpClient::new([HttpResponse {
            status: 502,
            body: String::new(),
        }]));
        let adapter = EastmoneyAdapter::new(http);

        let err = adapter
            .daily_history(&history_request())
            .await
            .expect_err("bad gateway must fail");
        assert_eq!(err.code(), "source.unavailable");
        assert!(err.retryable());
    }

    #[test]
    fn field_parser_handles_placeholders() {
        assert_eq!(parse_field("1.5"), Some(1.5));
        assert_eq!(parse_field("-"), None);
        assert_eq!(parse_field(""), None);
        assert_eq!(parse_field("-0.45"), Some(-0.45));
    }
}
