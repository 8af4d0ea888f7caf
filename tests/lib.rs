//! Shared helpers for the workspace behavioral tests.

use sinotick_core::{PriceRow, Symbol, TradeDate, TradingCalendar};

pub fn date(value: &str) -> TradeDate {
    TradeDate::parse(value).expect("test date must parse")
}

pub fn symbol(value: &str) -> Symbol {
    Symbol::parse(value).expect("test symbol must parse")
}

pub fn calendar(values: &[&str]) -> TradingCalendar {
    TradingCalendar::new(values.iter().map(|value| date(value)).collect())
}

pub fn close_row(value: &str, close: f64) -> PriceRow {
    PriceRow {
        close: Some(close),
        ..PriceRow::empty(date(value))
    }
}
