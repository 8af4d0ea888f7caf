mod date;
mod models;
mod quarter;
mod symbol;

pub use date::TradeDate;
pub use models::{
    Adjustment, AlignedPriceRow, AlignedPriceSeries, AlignedReportRow, AlignedReportSeries,
    MatchedReport, PriceRow, PriceSeries, ReportFields, ReportRow, Session,
};
pub use quarter::{Quarter, QuarterTag};
pub use symbol::{SecurityKind, Symbol};
