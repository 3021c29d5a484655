use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Low,
    Normal,
    High,
}

/// Inclusive normal range; values equal to either bound are `Normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Thresholds {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

pub fn classify(value: f64, thresholds: Thresholds) -> Classification {
    if value < thresholds.low {
        Classification::Low
    } else if value > thresholds.high {
        Classification::High
    } else {
        Classification::Normal
    }
}
