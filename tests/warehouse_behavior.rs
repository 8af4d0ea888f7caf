//! Round-trips between domain types and the warehouse record schema.

use sinotick_core::{
    align_price_series, PriceRow, PriceSeries, Session, TradeDate, TradingCalendar,
};
use sinotick_tests::{close_row, date, symbol};
use sinotick_warehouse::{BarRecord, Warehouse, WarehouseConfig};

fn open_temp() -> (tempfile::TempDir, Warehouse) {
    let dir = tempfile::tempdir().expect("temp dir must be creatable");
    let warehouse = Warehouse::open(WarehouseConfig::at(dir.path())).expect("warehouse must open");
    (dir, warehouse)
}

fn to_record(symbol: &str, row: &PriceRow) -> BarRecord {
    BarRecord {
        symbol: symbol.to_owned(),
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
    }
}

fn from_record(record: &BarRecord) -> PriceRow {
    PriceRow {
        date: TradeDate::parse(&record.trade_date).expect("stored date must parse"),
        open: record.open,
        close: record.close,
        high: record.high,
        low: record.low,
        volume: record.volume,
        amount: record.amount,
        swing: record.swing,
        pct_chg: record.pct_chg,
        change: record.price_change,
        turnover: record.turnover,
    }
}

#[test]
fn stored_bars_align_identically_to_fresh_ones() {
    let (_dir, warehouse) = open_temp();
    let code = "600519";
    let raw = PriceSeries::new(
        symbol(code),
        vec![close_row("2021-01-04", 10.0), close_row("2021-01-06", 12.0)],
    );

    let records: Vec<BarRecord> = raw.rows.iter().map(|row| to_record(code, row)).collect();
    warehouse
        .upsert_daily_bars("eastmoney", &records)
        .expect("upsert must succeed");

    let reloaded = PriceSeries::new(
        symbol(code),
        warehouse
            .load_daily_bars(code, "2021-01-01", "2021-12-31")
            .expect("load must succeed")
            .iter()
            .map(from_record)
            .collect(),
    );

    let trading_days = TradingCalendar::new(vec![
        date("2021-01-04"),
        date("2021-01-05"),
        date("2021-01-06"),
    ]);

    let from_fresh = align_price_series(&trading_days, &raw);
    let from_store = align_price_series(&trading_days, &reloaded);

    assert_eq!(from_fresh, from_store);
    assert_eq!(from_store.rows[1].session, Session::Suspension);
}

#[test]
fn calendar_round_trip_preserves_order() {
    let (_dir, warehouse) = open_temp();
    let dates = vec![
        String::from("2021-01-06"),
        String::from("2021-01-04"),
        String::from("2021-01-05"),
    ];

    warehouse
        .replace_calendar("sina", &dates)
        .expect("replace must succeed");

    let reloaded = warehouse.load_calendar().expect("load must succeed");
    assert_eq!(reloaded, ["2021-01-04", "2021-01-05", "2021-01-06"]);

    let parsed = TradingCalendar::new(
        reloaded
            .iter()
            .map(|value| TradeDate::parse(value).expect("stored date must parse"))
            .collect(),
    );
    assert_eq!(parsed.len(), 3);
}
