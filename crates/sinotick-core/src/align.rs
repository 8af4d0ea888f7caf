//! Trading-calendar alignment.
//!
//! Two transformations live here:
//!
//! 1. [`align_price_series`] reconciles an irregular, possibly gappy daily
//!    price series against the authoritative trading calendar, producing
//!    exactly one row per trading date with the suspension fill policy
//!    applied.
//! 2. [`align_reports_to_calendar`] joins point-in-time quarterly reports
//!    onto trading dates with a backward as-of match: each trading date gets
//!    the most recent report announced on or before it, never a later one.
//!
//! Both operate on snapshots already fetched into memory and never call back
//! into a data source.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::calendar::TradingCalendar;
use crate::domain::{
    AlignedPriceRow, AlignedPriceSeries, AlignedReportRow, AlignedReportSeries, MatchedReport,
    PriceRow, PriceSeries, ReportRow, Session, Symbol, TradeDate,
};

/// Errors raised by alignment entry points.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlignError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: TradeDate, end: TradeDate },

    #[error("report alignment needs an explicit date range or a pre-supplied calendar")]
    MissingRange,
}

/// Inclusive date range with `start <= end` enforced at construction, so the
/// check happens before any join is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: TradeDate,
    end: TradeDate,
}

impl DateRange {
    pub fn new(start: TradeDate, end: TradeDate) -> Result<Self, AlignError> {
        if start > end {
            return Err(AlignError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(self) -> TradeDate {
        self.start
    }

    pub const fn end(self) -> TradeDate {
        self.end
    }

    pub fn contains(self, date: TradeDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// How the report-alignment window is bounded: an explicit range, or the
/// first/last dates of a pre-supplied calendar.
#[derive(Debug, Clone, Copy)]
pub enum ReportWindow {
    Range(DateRange),
    FromCalendar,
}

impl ReportWindow {
    fn resolve(self, calendar: &TradingCalendar) -> Result<DateRange, AlignError> {
        match self {
            Self::Range(range) => Ok(range),
            Self::FromCalendar => match (calendar.first(), calendar.last()) {
                (Some(start), Some(end)) => {
                    DateRange::new(start, end).map_err(|_| AlignError::MissingRange)
                }
                _ => Err(AlignError::MissingRange),
            },
        }
    }
}

/// Produce one row per calendar date from a raw daily series.
///
/// Fill policy, per output field:
/// - `close`: forward-fill from the nearest earlier observation, else
///   backward-fill from the nearest later one (leading gap);
/// - `open`/`high`/`low`: when missing, the date's resolved close;
/// - all remaining numerics: `0` when missing;
/// - a date absent from the raw series is marked [`Session::Suspension`].
///
/// The raw series is normalized defensively: rows are keyed by date and a
/// later row for the same date replaces an earlier one.
pub fn align_price_series(
    calendar: &TradingCalendar,
    series: &PriceSeries,
) -> AlignedPriceSeries {
    let by_date: BTreeMap<TradeDate, &PriceRow> =
        series.rows.iter().map(|row| (row.date, row)).collect();

    // First known close bounds the leading-gap backward fill.
    let first_close = calendar
        .iter()
        .find_map(|date| by_date.get(&date).and_then(|row| row.close));

    let mut rows = Vec::with_capacity(calendar.len());
    let mut last_close: Option<f64> = None;

    for date in calendar.iter() {
        let raw = by_date.get(&date).copied();

        if let Some(observed) = raw.and_then(|row| row.close) {
            last_close = Some(observed);
        }
        let close = last_close.or(first_close).unwrap_or(0.0);

        rows.push(AlignedPriceRow {
            trade_date: date,
            session: if raw.is_some() {
                Session::Traded
            } else {
                Session::Suspension
            },
            open: raw.and_then(|row| row.open).unwrap_or(close),
            close,
            high: raw.and_then(|row| row.high).unwrap_or(close),
            low: raw.and_then(|row| row.low).unwrap_or(close),
            volume: raw.and_then(|row| row.volume).unwrap_or(0.0),
            amount: raw.and_then(|row| row.amount).unwrap_or(0.0),
            swing: raw.and_then(|row| row.swing).unwrap_or(0.0),
            pct_chg: raw.and_then(|row| row.pct_chg).unwrap_or(0.0),
            change: raw.and_then(|row| row.change).unwrap_or(0.0),
            turnover: raw.and_then(|row| row.turnover).unwrap_or(0.0),
        });
    }

    AlignedPriceSeries {
        symbol: series.symbol.clone(),
        rows,
    }
}

/// Join quarterly reports onto trading dates with a backward as-of match.
///
/// Steps:
/// 1. keep only `symbol`'s reports;
/// 2. stable-sort by announcement date; on duplicate announcement dates the
///    last row in input order wins (an arbitrary but deterministic policy
///    for same-day revisions);
/// 3. drop announcements outside the window;
/// 4. walk the calendar attaching the nearest report announced on or before
///    each trading date. Dates before the first announcement get `None`,
///    an expected condition for early history, not an error.
pub fn align_reports_to_calendar(
    calendar: &TradingCalendar,
    symbol: &Symbol,
    reports: &[ReportRow],
    window: ReportWindow,
) -> Result<AlignedReportSeries, AlignError> {
    let window = window.resolve(calendar)?;

    let mut mine: Vec<&ReportRow> = reports
        .iter()
        .filter(|report| report.symbol == *symbol)
        .collect();
    mine.sort_by_key(|report| report.announced);

    // Insertion order after the stable sort means later duplicates overwrite
    // earlier ones: last-in-input wins.
    let mut by_announcement: BTreeMap<TradeDate, &ReportRow> = BTreeMap::new();
    for report in mine {
        if window.contains(report.announced) {
            by_announcement.insert(report.announced, report);
        }
    }

    let announcements: Vec<(TradeDate, &ReportRow)> = by_announcement.into_iter().collect();

    let mut rows = Vec::with_capacity(calendar.len());
    let mut next = 0usize;
    let mut current: Option<&ReportRow> = None;

    for date in calendar.iter() {
        while next < announcements.len() && announcements[next].0 <= date {
            current = Some(announcements[next].1);
            next += 1;
        }

        rows.push(AlignedReportRow {
            trade_date: date,
            report: current.map(|report| MatchedReport {
                report_date: report.announced,
                period: report.period,
                fields: report.fields,
            }),
        });
    }

    Ok(AlignedReportSeries {
        symbol: symbol.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Quarter, QuarterTag, ReportFields};

    fn date(value: &str) -> TradeDate {
        TradeDate::parse(value).expect("test date must parse")
    }

    fn calendar(values: &[&str]) -> TradingCalendar {
        TradingCalendar::new(values.iter().map(|value| date(value)).collect())
    }

    fn close_row(value: &str, close: f64) -> PriceRow {
        PriceRow {
            close: Some(close),
            ..PriceRow::empty(date(value))
        }
    }

    fn report(symbol: &Symbol, announced: &str, year: i32, quarter: Quarter) -> ReportRow {
        ReportRow {
            symbol: symbol.clone(),
            announced: date(announced),
            period: QuarterTag::new(year, quarter),
            fields: ReportFields::empty(),
        }
    }

    #[test]
    fn output_length_always_matches_calendar() {
        let calendar = calendar(&["2021-01-04", "2021-01-05", "2021-01-06", "2021-01-07"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let series = PriceSeries::new(symbol, vec![close_row("2021-01-05", 11.0)]);

        let aligned = align_price_series(&calendar, &series);

        assert_eq!(aligned.rows.len(), calendar.len());
        let dates: Vec<TradeDate> = aligned.rows.iter().map(|row| row.trade_date).collect();
        assert_eq!(dates, calendar.iter().collect::<Vec<_>>());
    }

    #[test]
    fn suspension_day_forward_fills_close() {
        // Calendar 01-04..01-06 with 01-05 suspended: row2 carries row1's
        // close, and its open/high/low equal that resolved close.
        let calendar = calendar(&["2021-01-04", "2021-01-05", "2021-01-06"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let series = PriceSeries::new(
            symbol,
            vec![close_row("2021-01-04", 10.0), close_row("2021-01-06", 12.0)],
        );

        let aligned = align_price_series(&calendar, &series);

        assert_eq!(aligned.rows[0].close, 10.0);
        assert_eq!(aligned.rows[0].session, Session::Traded);

        let suspended = &aligned.rows[1];
        assert_eq!(suspended.session, Session::Suspension);
        assert_eq!(suspended.label(), "suspension");
        assert_eq!(suspended.close, 10.0);
        assert_eq!(suspended.open, 10.0);
        assert_eq!(suspended.high, 10.0);
        assert_eq!(suspended.low, 10.0);

        assert_eq!(aligned.rows[2].close, 12.0);
        assert_eq!(aligned.rows[2].session, Session::Traded);
    }

    #[test]
    fn leading_gap_backward_fills_from_first_observation() {
        let calendar = calendar(&["2021-01-04", "2021-01-05", "2021-01-06"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let series = PriceSeries::new(symbol, vec![close_row("2021-01-06", 12.0)]);

        let aligned = align_price_series(&calendar, &series);

        for row in &aligned.rows[..2] {
            assert_eq!(row.session, Session::Suspension);
            assert_eq!(row.close, 12.0);
            assert_eq!(row.open, 12.0);
            assert_eq!(row.high, 12.0);
            assert_eq!(row.low, 12.0);
        }
    }

    #[test]
    fn empty_series_yields_all_suspensions_at_zero() {
        let calendar = calendar(&["2021-01-04", "2021-01-05"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let series = PriceSeries::new(symbol, Vec::new());

        let aligned = align_price_series(&calendar, &series);

        assert_eq!(aligned.rows.len(), 2);
        for row in &aligned.rows {
            assert_eq!(row.session, Session::Suspension);
            assert_eq!(row.close, 0.0);
            assert_eq!(row.open, 0.0);
            assert_eq!(row.high, 0.0);
            assert_eq!(row.low, 0.0);
            assert_eq!(row.volume, 0.0);
        }
    }

    #[test]
    fn missing_secondary_fields_default_to_zero() {
        let calendar = calendar(&["2021-01-04"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let mut row = close_row("2021-01-04", 10.0);
        row.volume = Some(1_000.0);
        let series = PriceSeries::new(symbol, vec![row]);

        let aligned = align_price_series(&calendar, &series);

        assert_eq!(aligned.rows[0].volume, 1_000.0);
        assert_eq!(aligned.rows[0].amount, 0.0);
        assert_eq!(aligned.rows[0].turnover, 0.0);
    }

    #[test]
    fn partially_missing_row_keeps_traded_session() {
        // A present row with no close participates in the fill but is not a
        // suspension; only a fully absent date is.
        let calendar = calendar(&["2021-01-04", "2021-01-05"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let series = PriceSeries::new(
            symbol,
            vec![close_row("2021-01-04", 10.0), PriceRow::empty(date("2021-01-05"))],
        );

        let aligned = align_price_series(&calendar, &series);

        assert_eq!(aligned.rows[1].session, Session::Traded);
        assert_eq!(aligned.rows[1].close, 10.0);
    }

    #[test]
    fn duplicate_dates_resolve_to_last_row() {
        let calendar = calendar(&["2021-01-04"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let series = PriceSeries::new(
            symbol,
            vec![close_row("2021-01-04", 10.0), close_row("2021-01-04", 10.5)],
        );

        let aligned = align_price_series(&calendar, &series);
        assert_eq!(aligned.rows[0].close, 10.5);
    }

    #[test]
    fn realigning_aligned_data_is_a_no_op() {
        let calendar = calendar(&["2021-01-04", "2021-01-05", "2021-01-06"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let series = PriceSeries::new(
            symbol,
            vec![
                close_row("2021-01-04", 10.0),
                close_row("2021-01-06", 12.0),
            ],
        );

        let once = align_price_series(&calendar, &series);
        let as_raw = PriceSeries::new(
            once.symbol.clone(),
            once.rows
                .iter()
                .map(|row| PriceRow {
                    date: row.trade_date,
                    open: Some(row.open),
                    close: Some(row.close),
                    high: Some(row.high),
                    low: Some(row.low),
                    volume: Some(row.volume),
                    amount: Some(row.amount),
                    swing: Some(row.swing),
                    pct_chg: Some(row.pct_chg),
                    change: Some(row.change),
                    turnover: Some(row.turnover),
                })
                .collect(),
        );

        let twice = align_price_series(&calendar, &as_raw);

        assert_eq!(once.rows.len(), twice.rows.len());
        for (first, second) in once.rows.iter().zip(twice.rows.iter()) {
            assert_eq!(first.trade_date, second.trade_date);
            assert_eq!(first.close, second.close);
            assert_eq!(first.open, second.open);
            assert_eq!(first.high, second.high);
            assert_eq!(first.low, second.low);
        }
    }

    #[test]
    fn date_range_rejects_reversed_bounds() {
        let err = DateRange::new(date("2021-02-01"), date("2021-01-01")).expect_err("must fail");
        assert!(matches!(err, AlignError::InvalidRange { .. }));
    }

    #[test]
    fn report_window_requires_some_bound() {
        let empty = TradingCalendar::new(Vec::new());
        let symbol = Symbol::parse("600519").expect("valid symbol");

        let err = align_reports_to_calendar(&empty, &symbol, &[], ReportWindow::FromCalendar)
            .expect_err("must fail");
        assert_eq!(err, AlignError::MissingRange);
    }

    #[test]
    fn as_of_join_matches_most_recent_prior_announcement() {
        // Reports announced 2021-02-01 (Q4) and 2021-05-03 (Q1); trading
        // dates 01-15, 02-10, 06-01 match None, Q4, Q1 respectively.
        let calendar = calendar(&["2021-01-15", "2021-02-10", "2021-06-01"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let reports = vec![
            report(&symbol, "2021-02-01", 2020, Quarter::Q4),
            report(&symbol, "2021-05-03", 2021, Quarter::Q1),
        ];
        let window = ReportWindow::Range(
            DateRange::new(date("2021-01-01"), date("2021-12-31")).expect("valid range"),
        );

        let aligned = align_reports_to_calendar(&calendar, &symbol, &reports, window)
            .expect("alignment must succeed");

        assert!(aligned.rows[0].report.is_none());

        let second = aligned.rows[1].report.as_ref().expect("match expected");
        assert_eq!(second.report_date, date("2021-02-01"));
        assert_eq!(second.period, QuarterTag::new(2020, Quarter::Q4));

        let third = aligned.rows[2].report.as_ref().expect("match expected");
        assert_eq!(third.report_date, date("2021-05-03"));
        assert_eq!(third.period, QuarterTag::new(2021, Quarter::Q1));
    }

    #[test]
    fn as_of_matches_are_monotonic_and_never_look_ahead() {
        let calendar = calendar(&[
            "2021-01-15",
            "2021-02-01",
            "2021-02-10",
            "2021-05-03",
            "2021-06-01",
        ]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let reports = vec![
            report(&symbol, "2021-05-03", 2021, Quarter::Q1),
            report(&symbol, "2021-02-01", 2020, Quarter::Q4),
        ];

        let aligned = align_reports_to_calendar(
            &calendar,
            &symbol,
            &reports,
            ReportWindow::FromCalendar,
        )
        .expect("alignment must succeed");

        let mut previous: Option<TradeDate> = None;
        for row in &aligned.rows {
            if let Some(matched) = &row.report {
                assert!(matched.report_date <= row.trade_date, "look-ahead match");
                if let Some(prior) = previous {
                    assert!(matched.report_date >= prior, "matches must not regress");
                }
                previous = Some(matched.report_date);
            } else {
                assert!(previous.is_none(), "matches must not disappear");
            }
        }
    }

    #[test]
    fn duplicate_announcements_keep_last_in_input_order() {
        let calendar = calendar(&["2021-02-10"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");

        let mut revised = report(&symbol, "2021-02-01", 2020, Quarter::Q4);
        revised.fields.eps = Some(2.0);
        let mut original = report(&symbol, "2021-02-01", 2020, Quarter::Q4);
        original.fields.eps = Some(1.0);

        let aligned = align_reports_to_calendar(
            &calendar,
            &symbol,
            &[original, revised],
            ReportWindow::FromCalendar,
        )
        .expect("alignment must succeed");

        let matched = aligned.rows[0].report.as_ref().expect("match expected");
        assert_eq!(matched.fields.eps, Some(2.0));
    }

    #[test]
    fn reports_for_other_symbols_are_ignored() {
        let calendar = calendar(&["2021-02-10"]);
        let target = Symbol::parse("600519").expect("valid symbol");
        let other = Symbol::parse("000858").expect("valid symbol");
        let reports = vec![report(&other, "2021-02-01", 2020, Quarter::Q4)];

        let aligned =
            align_reports_to_calendar(&calendar, &target, &reports, ReportWindow::FromCalendar)
                .expect("alignment must succeed");

        assert!(aligned.rows[0].report.is_none());
    }

    #[test]
    fn announcements_outside_window_are_dropped() {
        let calendar = calendar(&["2021-02-10"]);
        let symbol = Symbol::parse("600519").expect("valid symbol");
        let reports = vec![report(&symbol, "2020-04-28", 2020, Quarter::Q1)];
        let window = ReportWindow::Range(
            DateRange::new(date("2021-01-01"), date("2021-12-31")).expect("valid range"),
        );

        let aligned = align_reports_to_calendar(&calendar, &symbol, &reports, window)
            .expect("alignment must succeed");

        assert!(aligned.rows[0].report.is_none());
    }
}
