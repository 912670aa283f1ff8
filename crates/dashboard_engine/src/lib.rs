use models::{
    BarEntry, BarPayload, CandleLayout, CandlePayload, CandleTrace, DashboardCharts, LineTrace,
    MonthlyRateRecord, OverlayLine, RateSeries, TimeSeriesPayload,
};

/// Trailing window used for the candlestick overlay.
pub const MOVING_AVERAGE_WINDOW: usize = 2;

const OVERLAY_COLOR: &str = "blue";
const OVERLAY_WIDTH: f64 = 1.0;

/// A rate series with the moving-average column appended.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries<'a> {
    pub series: &'a RateSeries,
    /// Same length as `series`; leading entries without a full window are `None`.
    pub moving_average: Vec<Option<f64>>,
}

impl<'a> DerivedSeries<'a> {
    pub fn new(series: &'a RateSeries) -> Self {
        let last = series.column(|r| r.last);
        Self {
            series,
            moving_average: rolling_mean(&last, MOVING_AVERAGE_WINDOW),
        }
    }

    pub fn records(&self) -> &[MonthlyRateRecord] {
        self.series.records()
    }
}

/// Simple trailing mean. Index `i` is `None` until `window` values are available.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Builds the three chart payloads for one rate series.
pub fn compose(series: &RateSeries) -> DashboardCharts {
    let derived = DerivedSeries::new(series);
    DashboardCharts {
        time_series: time_series_payload(&derived),
        bar: bar_payload(&derived),
        candle: candle_payload(&derived),
    }
}

fn time_series_payload(derived: &DerivedSeries<'_>) -> TimeSeriesPayload {
    let series = derived.series;
    let traces = [
        ("last", series.column(|r| r.last)),
        ("open", series.column(|r| r.open)),
        ("max", series.column(|r| r.max)),
        ("min", series.column(|r| r.min)),
    ]
    .into_iter()
    .map(|(name, y)| LineTrace {
        name: name.to_string(),
        y,
    })
    .collect();

    TimeSeriesPayload {
        x: series.months(),
        traces,
    }
}

// Colour categories follow the distinct `var` values, not the months.
fn bar_payload(derived: &DerivedSeries<'_>) -> BarPayload {
    let mut categories: Vec<f64> = vec![];
    let bars = derived
        .records()
        .iter()
        .map(|r| {
            let category = match categories.iter().position(|c| *c == r.var) {
                Some(idx) => idx,
                None => {
                    categories.push(r.var);
                    categories.len() - 1
                }
            };
            BarEntry {
                month: r.month.clone(),
                value: r.var,
                category,
            }
        })
        .collect();

    BarPayload { bars, categories }
}

fn candle_payload(derived: &DerivedSeries<'_>) -> CandlePayload {
    let series = derived.series;
    let x = series.months();
    CandlePayload {
        candles: CandleTrace {
            x: x.clone(),
            open: series.column(|r| r.open),
            high: series.column(|r| r.max),
            low: series.column(|r| r.min),
            close: series.column(|r| r.last),
            show_legend: false,
        },
        moving_average: OverlayLine {
            x,
            y: derived.moving_average.clone(),
            color: OVERLAY_COLOR.to_string(),
            width: OVERLAY_WIDTH,
            marker_size: 0.0,
            show_legend: false,
        },
        layout: CandleLayout {
            xaxis_rangeslider_visible: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::MonthKey;

    fn record(month: &str, open: f64, max: f64, min: f64, last: f64, var: f64) -> MonthlyRateRecord {
        MonthlyRateRecord {
            month: MonthKey::Label(month.to_string()),
            open,
            max,
            min,
            last,
            var,
        }
    }

    fn closes(lasts: &[f64]) -> RateSeries {
        lasts
            .iter()
            .enumerate()
            .map(|(i, last)| MonthlyRateRecord {
                month: MonthKey::Ordinal(i as i64 + 1),
                open: *last,
                max: *last,
                min: *last,
                last: *last,
                var: 0.0,
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_moving_average_example() {
        let series: RateSeries = vec![
            record("Jan", 9.0, 11.0, 8.0, 10.0, 0.0),
            record("Feb", 10.0, 21.0, 9.0, 20.0, 1.0),
            record("Mar", 20.0, 22.0, 14.0, 15.0, -0.25),
        ]
        .into();

        let derived = DerivedSeries::new(&series);
        assert_eq!(derived.moving_average, vec![None, Some(15.0), Some(17.5)]);
    }

    #[test]
    fn test_moving_average_length_and_values() {
        let lasts = [3.91, 3.87, 3.92, 4.05, 4.11, 3.99, 3.8];
        let series = closes(&lasts);
        let charts = compose(&series);
        let ma = &charts.candle.moving_average.y;

        assert_eq!(ma.len(), lasts.len());
        assert_eq!(ma[0], None);
        for i in 1..lasts.len() {
            let expected = (lasts[i - 1] + lasts[i]) / 2.0;
            let got = ma[i].expect("value after first month");
            assert!((got - expected).abs() < 1e-12, "index {i}: {got} != {expected}");
        }
    }

    #[test]
    fn test_single_record_has_no_average() {
        let charts = compose(&closes(&[42.0]));
        assert_eq!(charts.candle.moving_average.y, vec![None]);
    }

    #[test]
    fn test_rolling_mean_window_three() {
        assert_eq!(
            rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3),
            vec![None, None, Some(2.0), Some(3.0)]
        );
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let series: RateSeries = vec![
            record("Jan", 3.3, 3.4, 3.2, 3.35, 0.5),
            record("Feb", 3.35, 3.5, 3.3, 3.45, 0.5),
        ]
        .into();
        assert_eq!(compose(&series), compose(&series));
    }

    #[test]
    fn test_time_series_traces_follow_columns() {
        let series: RateSeries = vec![
            record("Jan", 1.0, 4.0, 0.5, 2.0, 0.1),
            record("Feb", 2.0, 5.0, 1.5, 3.0, 0.2),
        ]
        .into();
        let ts = compose(&series).time_series;

        assert_eq!(
            ts.x,
            vec![
                MonthKey::Label("Jan".to_string()),
                MonthKey::Label("Feb".to_string())
            ]
        );
        let names: Vec<&str> = ts.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["last", "open", "max", "min"]);
        assert_eq!(ts.traces[0].y, vec![2.0, 3.0]);
        assert_eq!(ts.traces[1].y, vec![1.0, 2.0]);
        assert_eq!(ts.traces[2].y, vec![4.0, 5.0]);
        assert_eq!(ts.traces[3].y, vec![0.5, 1.5]);
    }

    #[test]
    fn test_bar_categories_keyed_by_value() {
        let series: RateSeries = vec![
            record("Jan", 1.0, 1.0, 1.0, 1.0, 0.3),
            record("Feb", 1.0, 1.0, 1.0, 1.0, -0.1),
            record("Mar", 1.0, 1.0, 1.0, 1.0, 0.3),
        ]
        .into();
        let bar = compose(&series).bar;

        assert_eq!(bar.categories, vec![0.3, -0.1]);
        let cats: Vec<usize> = bar.bars.iter().map(|b| b.category).collect();
        assert_eq!(cats, vec![0, 1, 0]);
        let heights: Vec<f64> = bar.bars.iter().map(|b| b.value).collect();
        assert_eq!(heights, vec![0.3, -0.1, 0.3]);
    }

    #[test]
    fn test_candle_display_flags() {
        for series in [closes(&[]), closes(&[1.0]), closes(&[1.0, 2.0, 3.0])] {
            let candle = compose(&series).candle;
            assert!(!candle.layout.xaxis_rangeslider_visible);
            assert!(!candle.candles.show_legend);
            assert!(!candle.moving_average.show_legend);
            assert_eq!(candle.moving_average.width, 1.0);
            assert_eq!(candle.moving_average.marker_size, 0.0);
        }
    }

    #[test]
    fn test_candle_maps_ohlc_columns() {
        let series: RateSeries = vec![record("Jan", 1.0, 4.0, 0.5, 2.0, 0.1)].into();
        let candles = compose(&series).candle.candles;
        assert_eq!(candles.open, vec![1.0]);
        assert_eq!(candles.high, vec![4.0]);
        assert_eq!(candles.low, vec![0.5]);
        assert_eq!(candles.close, vec![2.0]);
    }

    #[test]
    fn test_empty_series_gives_empty_payloads() {
        let charts = compose(&RateSeries::default());

        assert!(charts.time_series.x.is_empty());
        assert_eq!(charts.time_series.traces.len(), 4);
        assert!(charts.time_series.traces.iter().all(|t| t.y.is_empty()));
        assert!(charts.bar.bars.is_empty());
        assert!(charts.bar.categories.is_empty());
        assert!(charts.candle.candles.x.is_empty());
        assert!(charts.candle.moving_average.y.is_empty());
    }

    #[test]
    fn test_gap_serializes_as_null() {
        let json = serde_json::to_value(compose(&closes(&[1.0, 3.0]))).unwrap();
        assert_eq!(
            json["candle"]["moving_average"]["y"],
            serde_json::json!([null, 2.0])
        );
    }
}
