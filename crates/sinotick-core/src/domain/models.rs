use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{QuarterTag, Symbol, TradeDate, ValidationError};

/// Price adjustment applied to historical bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Adjustment {
    /// Raw exchange prices.
    #[serde(rename = "none")]
    None,
    /// Forward-adjusted ("qfq"): past prices restated for splits/dividends.
    #[serde(rename = "qfq")]
    Forward,
    /// Backward-adjusted ("hfq").
    #[serde(rename = "hfq")]
    Backward,
}

impl Adjustment {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Forward => "qfq",
            Self::Backward => "hfq",
        }
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::Forward
    }
}

impl Display for Adjustment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Adjustment {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "qfq" => Ok(Self::Forward),
            "hfq" => Ok(Self::Backward),
            other => Err(ValidationError::InvalidAdjustment {
                value: other.to_owned(),
            }),
        }
    }
}

/// One raw daily observation as returned by a provider.
///
/// Every numeric field is optional before alignment; providers omit fields
/// freely and suspension days are simply absent from the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: TradeDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
    pub swing: Option<f64>,
    pub pct_chg: Option<f64>,
    pub change: Option<f64>,
    pub turnover: Option<f64>,
}

impl PriceRow {
    /// A row with only the date set; fields are filled by the caller.
    pub fn empty(date: TradeDate) -> Self {
        Self {
            date,
            open: None,
            close: None,
            high: None,
            low: None,
            volume: None,
            amount: None,
            swing: None,
            pct_chg: None,
            change: None,
            turnover: None,
        }
    }
}

/// Raw per-symbol daily series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub rows: Vec<PriceRow>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, rows: Vec<PriceRow>) -> Self {
        Self { symbol, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Metrics carried by a quarterly performance report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportFields {
    pub eps: Option<f64>,
    pub revenue: Option<f64>,
    pub revenue_yoy: Option<f64>,
    pub net_profit: Option<f64>,
    pub net_profit_yoy: Option<f64>,
    pub bps: Option<f64>,
    pub roe: Option<f64>,
    pub cash_flow_per_share: Option<f64>,
    pub gross_margin: Option<f64>,
}

impl ReportFields {
    pub const fn empty() -> Self {
        Self {
            eps: None,
            revenue: None,
            revenue_yoy: None,
            net_profit: None,
            net_profit_yoy: None,
            bps: None,
            roe: None,
            cash_flow_per_share: None,
            gross_margin: None,
        }
    }
}

/// One quarterly filing, keyed by symbol and announcement date.
///
/// `announced` is the date the filing became public knowledge; `period` is
/// the quarter it covers. The two routinely differ by weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub symbol: Symbol,
    pub announced: TradeDate,
    pub period: QuarterTag,
    pub fields: ReportFields,
}

/// Whether the security traded on a given calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    Traded,
    Suspension,
}

impl Session {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Traded => "traded",
            Self::Suspension => "suspension",
        }
    }
}

/// One calendar-complete output row of price alignment.
///
/// All numeric fields are concrete after alignment; the fill policy has
/// already resolved every gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPriceRow {
    pub trade_date: TradeDate,
    pub session: Session,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub amount: f64,
    pub swing: f64,
    pub pct_chg: f64,
    pub change: f64,
    pub turnover: f64,
}

impl AlignedPriceRow {
    /// Axis label for downstream renderers: the date for traded days, the
    /// literal `suspension` marker otherwise.
    pub fn label(&self) -> String {
        match self.session {
            Session::Traded => self.trade_date.format_dashed(),
            Session::Suspension => String::from("suspension"),
        }
    }
}

/// Calendar-aligned daily series: exactly one row per trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPriceSeries {
    pub symbol: Symbol,
    pub rows: Vec<AlignedPriceRow>,
}

/// The report matched to a trading date by the backward as-of join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedReport {
    /// Announcement date the match came from; never after the trading date.
    pub report_date: TradeDate,
    pub period: QuarterTag,
    pub fields: ReportFields,
}

/// One output row of report alignment. `report` is `None` for trading dates
/// that precede every known announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedReportRow {
    pub trade_date: TradeDate,
    pub report: Option<MatchedReport>,
}

/// Calendar-joined report series for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedReportSeries {
    pub symbol: Symbol,
    pub rows: Vec<AlignedReportRow>,
}
