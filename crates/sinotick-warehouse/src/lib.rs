//! DuckDB-backed local store for fetched market data.
//!
//! Persistence is optional for every caller: the alignment core never reads
//! or writes here, and a failed store surfaces as a warning upstream, not a
//! fetch failure.

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::params;
use serde::Serialize;
use thiserror::Error;

pub use self::duckdb::{ConnectionManager, PooledConnection};
use self::migrations::escape_sql_string;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        let home = resolve_home();
        let db_path = home.join("cache").join("warehouse.duckdb");
        Self {
            home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl WarehouseConfig {
    /// Config rooted at an explicit directory, bypassing env resolution.
    pub fn at(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let db_path = home.join("cache").join("warehouse.duckdb");
        Self {
            home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// `SINOTICK_HOME` wins; otherwise `~/.sinotick`, falling back to the
/// working directory when no home dir is resolvable.
fn resolve_home() -> PathBuf {
    if let Ok(explicit) = env::var("SINOTICK_HOME") {
        if !explicit.trim().is_empty() {
            return PathBuf::from(explicit);
        }
    }

    if let Ok(user_home) = env::var("HOME") {
        if !user_home.trim().is_empty() {
            return PathBuf::from(user_home).join(".sinotick");
        }
    }

    PathBuf::from(".sinotick")
}

/// One persisted daily bar. Dates travel as `YYYY-MM-DD` strings; the
/// caller owns conversion to and from domain types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRecord {
    pub symbol: String,
    pub trade_date: String,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
    pub swing: Option<f64>,
    pub pct_chg: Option<f64>,
    pub price_change: Option<f64>,
    pub turnover: Option<f64>,
}

/// One persisted quarterly report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub symbol: String,
    pub announced: String,
    pub period: String,
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

#[derive(Clone)]
pub struct Warehouse {
    config: WarehouseConfig,
    manager: ConnectionManager,
}

impl Warehouse {
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = ConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let warehouse = Self { config, manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    pub fn home(&self) -> &Path {
        self.config.home.as_path()
    }

    pub fn upsert_daily_bars(
        &self,
        source: &str,
        rows: &[BarRecord],
    ) -> Result<(), WarehouseError> {
        if rows.is_empty() {
            return Ok(());
        }

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            for row in rows {
                let sql = format!(
                    r#"
INSERT OR REPLACE INTO daily_bars (
    symbol, trade_date, open, close, high, low, volume, amount,
    swing, pct_chg, price_change, turnover, source, updated_at
) VALUES (
    '{symbol}', TRY_CAST('{trade_date}' AS DATE), {open}, {close}, {high}, {low},
    {volume}, {amount}, {swing}, {pct_chg}, {price_change}, {turnover},
    '{source}', CURRENT_TIMESTAMP
);
"#,
                    symbol = escape_sql_string(row.symbol.as_str()),
                    trade_date = escape_sql_string(row.trade_date.as_str()),
                    open = sql_option_f64(row.open),
                    close = sql_option_f64(row.close),
                    high = sql_option_f64(row.high),
                    low = sql_option_f64(row.low),
                    volume = sql_option_f64(row.volume),
                    amount = sql_option_f64(row.amount),
                    swing = sql_option_f64(row.swing),
                    pct_chg = sql_option_f64(row.pct_chg),
                    price_change = sql_option_f64(row.price_change),
                    turnover = sql_option_f64(row.turnover),
                    source = escape_sql_string(source),
                );
                connection.execute_batch(sql.as_str())?;
            }
            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    pub fn load_daily_bars(
        &self,
        symbol: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<BarRecord>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            r#"
SELECT symbol, CAST(trade_date AS VARCHAR), open, close, high, low, volume,
       amount, swing, pct_chg, price_change, turnover
FROM daily_bars
WHERE symbol = ?
  AND trade_date >= TRY_CAST(? AS DATE)
  AND trade_date <= TRY_CAST(? AS DATE)
ORDER BY trade_date ASC
"#,
        )?;

        let rows = statement.query_map(params![symbol, start, end], |row| {
            Ok(BarRecord {
                symbol: row.get(0)?,
                trade_date: row.get(1)?,
                open: row.get(2)?,
                close: row.get(3)?,
                high: row.get(4)?,
                low: row.get(5)?,
                volume: row.get(6)?,
                amount: row.get(7)?,
                swing: row.get(8)?,
                pct_chg: row.get(9)?,
                price_change: row.get(10)?,
                turnover: row.get(11)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn upsert_reports(
        &self,
        source: &str,
        rows: &[ReportRecord],
    ) -> Result<(), WarehouseError> {
        if rows.is_empty() {
            return Ok(());
        }

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            for row in rows {
                let sql = format!(
                    r#"
INSERT OR REPLACE INTO quarterly_reports (
    symbol, announced, period, eps, revenue, revenue_yoy, net_profit,
    net_profit_yoy, bps, roe, cash_flow_per_share, gross_margin,
    source, updated_at
) VALUES (
    '{symbol}', TRY_CAST('{announced}' AS DATE), '{period}', {eps}, {revenue},
    {revenue_yoy}, {net_profit}, {net_profit_yoy}, {bps}, {roe},
    {cash_flow_per_share}, {gross_margin}, '{source}', CURRENT_TIMESTAMP
);
"#,
                    symbol = escape_sql_string(row.symbol.as_str()),
                    announced = escape_sql_string(row.announced.as_str()),
                    period = escape_sql_string(row.period.as_str()),
                    eps = sql_option_f64(row.eps),
                    revenue = sql_option_f64(row.revenue),
                    revenue_yoy = sql_option_f64(row.revenue_yoy),
                    net_profit = sql_option_f64(row.net_profit),
                    net_profit_yoy = sql_option_f64(row.net_profit_yoy),
                    bps = sql_option_f64(row.bps),
                    roe = sql_option_f64(row.roe),
                    cash_flow_per_share = sql_option_f64(row.cash_flow_per_share),
                    gross_margin = sql_option_f64(row.gross_margin),
                    source = escape_sql_string(source),
                );
                connection.execute_batch(sql.as_str())?;
            }
            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    /// Reports for one symbol, announcement-date ascending.
    pub fn load_reports(&self, symbol: &str) -> Result<Vec<ReportRecord>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            r#"
SELECT symbol, CAST(announced AS VARCHAR), period, eps, revenue, revenue_yoy,
       net_profit, net_profit_yoy, bps, roe, cash_flow_per_share, gross_margin
FROM quarterly_reports
WHERE symbol = ?
ORDER BY announced ASC, period ASC
"#,
        )?;

        let rows = statement.query_map(params![symbol], |row| {
            Ok(ReportRecord {
                symbol: row.get(0)?,
                announced: row.get(1)?,
                period: row.get(2)?,
                eps: row.get(3)?,
                revenue: row.get(4)?,
                revenue_yoy: row.get(5)?,
                net_profit: row.get(6)?,
                net_profit_yoy: row.get(7)?,
                bps: row.get(8)?,
                roe: row.get(9)?,
                cash_flow_per_share: row.get(10)?,
                gross_margin: row.get(11)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Replaces the stored calendar wholesale; the feed is always the full
    /// known history, so incremental upserts buy nothing.
    pub fn replace_calendar(&self, source: &str, dates: &[String]) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            connection.execute_batch("DELETE FROM trading_calendar")?;
            for date in dates {
                let sql = format!(
                    r#"
INSERT OR IGNORE INTO trading_calendar (trade_date, source, updated_at)
VALUES (TRY_CAST('{date}' AS DATE), '{source}', CURRENT_TIMESTAMP);
"#,
                    date = escape_sql_string(date.as_str()),
                    source = escape_sql_string(source),
                );
                connection.execute_batch(sql.as_str())?;
            }
            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    pub fn load_calendar(&self) -> Result<Vec<String>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT CAST(trade_date AS VARCHAR) FROM trading_calendar ORDER BY trade_date ASC",
        )?;

        let rows = statement.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn finalize_transaction<T>(
    connection: &::duckdb::Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn sql_option_f64(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => value.to_string(),
        _ => String::from("NULL"),
    }
}
