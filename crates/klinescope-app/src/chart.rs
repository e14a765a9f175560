//! Chart-view rendering collaborator.
//!
//! A pure read of the accumulated series: human-readable timestamps as
//! labels, close prices as values, plus a one-line text rendering for the
//! terminal. Never writes back.

use klinescope_core::{Candle, Price};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Labels and close values derived from one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartView {
    /// Human-readable open times (UTC, HH:MM:SS).
    pub labels: Vec<String>,
    /// Close price per point.
    pub closes: Vec<Price>,
}

impl ChartView {
    /// Build the view from a series; one label and one value per candle.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let labels = candles
            .iter()
            .map(|c| {
                c.open_time()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| c.open_time_ms.to_string())
            })
            .collect();
        let closes = candles.iter().map(|c| c.close).collect();
        Self { labels, closes }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// One-line rendering: point count, latest close, and a sparkline of
    /// the close values.
    pub fn render_line(&self) -> String {
        let Some(last) = self.closes.last() else {
            return "0 points".to_string();
        };
        format!(
            "{} points  last {}  {}",
            self.closes.len(),
            last,
            sparkline(&self.closes)
        )
    }
}

/// Map close values onto block characters between the series min and max.
fn sparkline(closes: &[Price]) -> String {
    let values: Vec<f64> = closes
        .iter()
        .map(|p| p.inner().to_string().parse().unwrap_or(0.0))
        .collect();

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            let level = if span <= f64::EPSILON {
                0
            } else {
                let scaled = (v - min) / span * (SPARK_LEVELS.len() - 1) as f64;
                scaled.round() as usize
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(time: i64, close: rust_decimal::Decimal) -> Candle {
        Candle::new(
            time,
            Price::new(dec!(10)),
            Price::new(dec!(12)),
            Price::new(dec!(9)),
            Price::new(close),
        )
    }

    #[test]
    fn test_view_from_empty_series() {
        let view = ChartView::from_candles(&[]);
        assert!(view.is_empty());
        assert_eq!(view.render_line(), "0 points");
    }

    #[test]
    fn test_view_labels_and_closes() {
        let candles = vec![
            candle(1_700_000_000_000, dec!(11)),
            candle(1_700_000_060_000, dec!(12)),
        ];
        let view = ChartView::from_candles(&candles);

        assert_eq!(view.len(), 2);
        assert_eq!(view.closes, vec![Price::new(dec!(11)), Price::new(dec!(12))]);
        // 1_700_000_000_000 ms = 2023-11-14 22:13:20 UTC
        assert_eq!(view.labels[0], "22:13:20");
    }

    #[test]
    fn test_render_line_mentions_last_close() {
        let candles = vec![candle(1000, dec!(11)), candle(2000, dec!(12.5))];
        let view = ChartView::from_candles(&candles);

        let line = view.render_line();
        assert!(line.starts_with("2 points"));
        assert!(line.contains("12.5"));
    }

    #[test]
    fn test_sparkline_spans_min_to_max() {
        let closes = vec![
            Price::new(dec!(1)),
            Price::new(dec!(5)),
            Price::new(dec!(9)),
        ];
        let line = sparkline(&closes);
        let chars: Vec<char> = line.chars().collect();
        assert_eq!(chars.first(), Some(&'▁'));
        assert_eq!(chars.last(), Some(&'█'));
    }

    #[test]
    fn test_sparkline_flat_series() {
        let closes = vec![Price::new(dec!(7)); 3];
        assert_eq!(sparkline(&closes), "▁▁▁");
    }
}
