//! Bounded fan-out over independent remote fetches.
//!
//! Each unit of work (one symbol's history, one quarter's report table) is
//! independent. Results are collected into disjoint keys as tasks finish, so
//! there is no ordering guarantee and no shared-state mutation beyond the
//! insert. A failed or empty fetch is logged and its key omitted; siblings
//! keep running and nothing is retried.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::align::DateRange;
use crate::data_source::{HistoryRequest, MarketDataSource, ReportRequest};
use crate::domain::{Adjustment, PriceSeries, QuarterTag, ReportRow, Symbol};

/// Worker-bounded fetch fan-out.
#[derive(Debug, Clone, Copy)]
pub struct FetchPool {
    workers: usize,
}

impl FetchPool {
    pub const DEFAULT_WORKERS: usize = 12;

    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Fetch daily history for every symbol, keyed by symbol.
    ///
    /// Symbols whose fetch fails or returns no rows are absent from the map.
    pub async fn fetch_histories(
        &self,
        source: Arc<dyn MarketDataSource>,
        symbols: &[Symbol],
        range: DateRange,
        adjustment: Adjustment,
    ) -> HashMap<Symbol, PriceSeries> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for symbol in symbols.iter().cloned() {
            let source = Arc::clone(&source);
            let semaphore = Arc::clone(&semaphore);
            let request = HistoryRequest::new(symbol.clone(), range, adjustment);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("fetch semaphore is never closed");
                let result = source.daily_history(&request).await;
                (symbol, result)
            });
        }

        let mut collected = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((symbol, Ok(series))) if !series.is_empty() => {
                    collected.insert(symbol, series);
                }
                Ok((symbol, Ok(_))) => {
                    warn!(symbol = %symbol, "history fetch returned no rows, skipping");
                }
                Ok((symbol, Err(error))) => {
                    warn!(symbol = %symbol, %error, "history fetch failed, skipping");
                }
                Err(join_error) => {
                    warn!(%join_error, "history fetch task aborted");
                }
            }
        }

        collected
    }

    /// Fetch quarterly report tables for every period, concatenated.
    ///
    /// Periods whose fetch fails contribute no rows.
    pub async fn fetch_reports(
        &self,
        source: Arc<dyn MarketDataSource>,
        periods: &[QuarterTag],
    ) -> Vec<ReportRow> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for period in periods.iter().copied() {
            let source = Arc::clone(&source);
            let semaphore = Arc::clone(&semaphore);
            let request = ReportRequest::new(period);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("fetch semaphore is never closed");
                let result = source.quarterly_reports(&request).await;
                (period, result)
            });
        }

        let mut collected = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(rows))) => collected.extend(rows),
                Ok((period, Err(error))) => {
                    warn!(period = %period, %error, "report fetch failed, skipping");
                }
                Err(join_error) => {
                    warn!(%join_error, "report fetch task aborted");
                }
            }
        }

        collected
    }
}

impl Default for FetchPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORKERS)
    }
}
