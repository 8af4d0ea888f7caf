//! Chart-series preparation for an external candlestick renderer.
//!
//! The renderer draws candles with moving-average overlays and assumes a
//! gap-free date axis; feeding it an aligned series is what makes that hold.

use serde::{Deserialize, Serialize};

use crate::domain::AlignedPriceSeries;
use crate::Symbol;

/// Default moving-average windows drawn over the candles.
pub const DEFAULT_MA_WINDOWS: [usize; 3] = [5, 10, 20];

/// One candle in renderer order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
}

/// Rolling mean of closes over a fixed window.
///
/// Values are `None` until the window fills, matching the renderer's
/// expectation of a leading blank segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

/// Everything a renderer needs: axis labels, candles, overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub symbol: Symbol,
    pub labels: Vec<String>,
    pub candles: Vec<Candle>,
    pub overlays: Vec<MovingAverage>,
}

impl ChartSeries {
    pub fn from_aligned(series: &AlignedPriceSeries, windows: &[usize]) -> Self {
        let labels = series.rows.iter().map(|row| row.label()).collect();
        let candles = series
            .rows
            .iter()
            .map(|row| Candle {
                open: row.open,
                close: row.close,
                low: row.low,
                high: row.high,
            })
            .collect();

        let closes: Vec<f64> = series.rows.iter().map(|row| row.close).collect();
        let overlays = windows
            .iter()
            .copied()
            .filter(|window| *window > 0)
            .map(|window| MovingAverage {
                window,
                values: rolling_mean(&closes, window),
            })
            .collect();

        Self {
            symbol: series.symbol.clone(),
            labels,
            candles,
            overlays,
        }
    }
}

fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut means = Vec::with_capacity(values.len());
    let mut running = 0.0;

    for (index, value) in values.iter().enumerate() {
        running += value;
        if index + 1 < window {
            means.push(None);
            continue;
        }
        if index + 1 > window {
            running -= values[index - window];
        }
        means.push(Some(running / window as f64));
    }

    means
}
