use crate::classify::Classification;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One timestamped reading, optionally tagged with a category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: NaiveDateTime, kind: Option<&str>, value: f64) -> Self {
        Self {
            timestamp,
            kind: kind.map(str::to_owned),
            value,
        }
    }

    pub fn untyped(timestamp: NaiveDateTime, value: f64) -> Self {
        Self::new(timestamp, None, value)
    }

    pub fn typed(timestamp: NaiveDateTime, kind: &str, value: f64) -> Self {
        Self::new(timestamp, Some(kind), value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub order: Option<String>,
    /// Comma-separated type labels, e.g. `glucose,insulin`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub label: Option<String>,
    pub title: String,
    pub unit: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub latest: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertView {
    pub label: String,
    pub value: f64,
    pub status: Classification,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesHistogram {
    pub label: Option<String>,
    pub title: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    pub label: Option<String>,
    pub title: String,
    pub points: Vec<TimePoint>,
}

/// Everything the page shows, recomputed from the store after each change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub variant: String,
    pub total_count: usize,
    pub summaries: Vec<SeriesSummary>,
    pub alert: Option<AlertView>,
    pub time_series: Vec<TimeSeries>,
    pub histograms: Vec<SeriesHistogram>,
    pub table: Vec<Observation>,
    pub exports_enabled: bool,
}
