//! Conversions into the warehouse record schema and the store calls.
//!
//! Store failures never fail a fetch: callers turn the error into an
//! envelope warning.

use std::collections::HashMap;

use sinotick_core::{PriceSeries, ProviderId, ReportRow, Symbol};
use sinotick_warehouse::{BarRecord, ReportRecord, Warehouse, WarehouseError};

pub(crate) fn store_bars(
    fetched: &HashMap<Symbol, PriceSeries>,
) -> Result<usize, WarehouseError> {
    let warehouse = Warehouse::open_default()?;
    let mut stored = 0;

    for (symbol, series) in fetched {
        let records: Vec<BarRecord> = series
            .rows
            .iter()
            .map(|row| BarRecord {
                symbol: symbol.canonical(),
                trade_date: row.date.format_dashed(),
                open: row.open,
                close: row.close,
                high: row.high,
                low: row.low,
                volume: row.volume,
                amount: row.amount,
                swing: row.swing,
                pct_chg: row.pct_chg,
                price_change: row.change,
                turnover: row.turnover,
            })
            .collect();

        warehouse.upsert_daily_bars(ProviderId::Eastmoney.as_str(), &records)?;
        stored += records.len();
    }

    Ok(stored)
}

pub(crate) fn store_reports(rows: &[ReportRow]) -> Result<usize, WarehouseError> {
    let warehouse = Warehouse::open_default()?;

    let records: Vec<ReportRecord> = rows
        .iter()
        .map(|row| ReportRecord {
            symbol: row.symbol.canonical(),
            announced: row.announced.format_dashed(),
            period: row.period.as_compact(),
            eps: row.fields.eps,
            revenue: row.fields.revenue,
            revenue_yoy: row.fields.revenue_yoy,
            net_profit: row.fields.net_profit,
            net_profit_yoy: row.fields.net_profit_yoy,
            bps: row.fields.bps,
            roe: row.fields.roe,
            cash_flow_per_share: row.fields.cash_flow_per_share,
            gross_margin: row.fields.gross_margin,
        })
        .collect();

    warehouse.upsert_reports(ProviderId::Eastmoney.as_str(), &records)?;
    Ok(records.len())
}
