use crate::classify::classify;
use crate::config::AppConfig;
use crate::models::{
    AlertView, DashboardView, HistogramBin, Observation, SeriesHistogram, SeriesSummary,
    TimePoint, TimeSeries,
};
use crate::store::SessionStore;

pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStatistics {
    pub mean: Option<f64>,
    pub latest: Option<f64>,
    pub count: usize,
}

pub fn summary_statistics(subset: &[&Observation]) -> SummaryStatistics {
    let count = subset.len();
    let mean = if count == 0 {
        None
    } else {
        Some(subset.iter().map(|obs| obs.value).sum::<f64>() / count as f64)
    };

    SummaryStatistics {
        mean,
        latest: subset.last().map(|obs| obs.value),
        count,
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Equal-width bins spanning `[min, max]`; the last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        out[index].count += 1;
    }

    out
}

/// Recomputes every derived view from the current store contents.
pub fn build_dashboard(store: &SessionStore, config: &AppConfig) -> DashboardView {
    let series = config.series();
    let mut summaries = Vec::with_capacity(series.len());
    let mut time_series = Vec::with_capacity(series.len());
    let mut histograms = Vec::with_capacity(series.len());
    let mut typed = store.partition_by_type(&config.labels());

    for spec in series {
        let subset = match spec.label {
            Some(label) => typed.remove(label).unwrap_or_default(),
            None => store.untyped(),
        };
        let values: Vec<f64> = subset.iter().map(|obs| obs.value).collect();
        let summary = summary_statistics(&subset);
        let label = spec.label.map(str::to_owned);

        summaries.push(SeriesSummary {
            label: label.clone(),
            title: spec.title.to_string(),
            unit: spec.unit.to_string(),
            count: summary.count,
            mean: summary.mean,
            latest: summary.latest,
            median: median(&values),
            std_dev: std_dev(&values),
        });

        if subset.is_empty() {
            continue;
        }

        time_series.push(TimeSeries {
            label: label.clone(),
            title: spec.title.to_string(),
            points: subset
                .iter()
                .map(|obs| TimePoint {
                    timestamp: obs.timestamp,
                    value: obs.value,
                })
                .collect(),
        });

        histograms.push(SeriesHistogram {
            label,
            title: spec.title.to_string(),
            bins: histogram(&values, HISTOGRAM_BINS),
        });
    }

    let alert = match (config.alert_series(), config.thresholds) {
        (Some(spec), Some(thresholds)) => spec.label.and_then(|label| {
            store.latest(Some(label)).map(|obs| AlertView {
                label: label.to_string(),
                value: obs.value,
                status: classify(obs.value, thresholds),
                low: thresholds.low,
                high: thresholds.high,
            })
        }),
        _ => None,
    };

    DashboardView {
        variant: config.variant.to_string(),
        total_count: store.count(),
        summaries,
        alert,
        time_series,
        histograms,
        table: store.sorted_view(true).into_iter().cloned().collect(),
        exports_enabled: config.variant.exports_enabled(),
    }
}
