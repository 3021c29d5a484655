use crate::classify::Thresholds;
use crate::errors::ConfigError;
use std::{env, fmt, str::FromStr, time::Duration};

pub const GLUCOSE: &str = "glucose";
pub const INSULIN: &str = "insulin";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// One input field and the stream of observations it produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSpec {
    /// `None` for the generic logger, which stores untyped values.
    pub label: Option<&'static str>,
    pub field: &'static str,
    pub title: &'static str,
    pub unit: &'static str,
}

const GENERIC_SERIES: &[SeriesSpec] = &[SeriesSpec {
    label: None,
    field: "value",
    title: "Value",
    unit: "",
}];

const TRACKER_SERIES: &[SeriesSpec] = &[
    SeriesSpec {
        label: Some(GLUCOSE),
        field: GLUCOSE,
        title: "Blood glucose",
        unit: "mg/dL",
    },
    SeriesSpec {
        label: Some(INSULIN),
        field: INSULIN,
        title: "Insulin dose",
        unit: "units",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Generic,
    Tracker,
    TrackerExport,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Generic => "generic",
            Variant::Tracker => "tracker",
            Variant::TrackerExport => "tracker-export",
        }
    }

    pub fn series(self) -> &'static [SeriesSpec] {
        match self {
            Variant::Generic => GENERIC_SERIES,
            Variant::Tracker | Variant::TrackerExport => TRACKER_SERIES,
        }
    }

    pub fn default_thresholds(self) -> Option<Thresholds> {
        match self {
            Variant::Generic => None,
            Variant::Tracker => Some(Thresholds::new(90.0, 120.0)),
            Variant::TrackerExport => Some(Thresholds::new(90.0, 200.0)),
        }
    }

    pub fn exports_enabled(self) -> bool {
        matches!(self, Variant::TrackerExport)
    }

    pub fn title(self) -> &'static str {
        match self {
            Variant::Generic => "Reading Log",
            Variant::Tracker | Variant::TrackerExport => "Glucose & Insulin Log",
        }
    }
}

impl FromStr for Variant {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "generic" => Ok(Variant::Generic),
            "tracker" => Ok(Variant::Tracker),
            "tracker-export" => Ok(Variant::TrackerExport),
            other => Err(ConfigError::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub variant: Variant,
    /// Alert thresholds for the first labelled series; `None` disables the alert.
    pub thresholds: Option<Thresholds>,
    pub session_ttl: Duration,
}

impl AppConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            port: DEFAULT_PORT,
            variant,
            thresholds: variant.default_thresholds(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let variant = match lookup("APP_VARIANT") {
            Some(value) => value.parse()?,
            None => Variant::Tracker,
        };
        let mut config = Self::for_variant(variant);

        if let Some(port) = parse_var::<u16>(&lookup, "PORT")? {
            config.port = port;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "SESSION_TTL_SECS")? {
            config.session_ttl = Duration::from_secs(secs);
        }

        let low = parse_threshold(&lookup, "GLUCOSE_LOW")?;
        let high = parse_threshold(&lookup, "GLUCOSE_HIGH")?;
        if let Some(mut thresholds) = config.thresholds {
            thresholds.low = low.unwrap_or(thresholds.low);
            thresholds.high = high.unwrap_or(thresholds.high);
            if thresholds.low > thresholds.high {
                return Err(ConfigError::InvalidThresholds {
                    low: thresholds.low,
                    high: thresholds.high,
                });
            }
            config.thresholds = Some(thresholds);
        }

        Ok(config)
    }

    pub fn series(&self) -> &'static [SeriesSpec] {
        self.variant.series()
    }

    /// The series whose latest reading drives the alert banner.
    pub fn alert_series(&self) -> Option<&'static SeriesSpec> {
        if self.thresholds.is_none() {
            return None;
        }
        self.series().iter().find(|spec| spec.label.is_some())
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.series().iter().filter_map(|spec| spec.label).collect()
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

/// Thresholds must be finite; `NaN` would make every comparison false.
fn parse_threshold(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<f64>, ConfigError> {
    match parse_var::<f64>(lookup, key)? {
        Some(value) if !value.is_finite() => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_tracker() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.variant, Variant::Tracker);
        assert_eq!(config.port, 8080);
        assert_eq!(config.thresholds, Some(Thresholds::new(90.0, 120.0)));
        assert_eq!(config.labels(), vec![GLUCOSE, INSULIN]);
    }

    #[test]
    fn export_variant_uses_wider_range() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("APP_VARIANT", "tracker-export")])).unwrap();
        assert_eq!(config.thresholds, Some(Thresholds::new(90.0, 200.0)));
        assert!(config.variant.exports_enabled());
    }

    #[test]
    fn generic_has_no_alert() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_VARIANT", "generic"),
            ("GLUCOSE_HIGH", "150"),
        ]))
        .unwrap();
        assert!(config.thresholds.is_none());
        assert!(config.alert_series().is_none());
        assert!(config.labels().is_empty());
    }

    #[test]
    fn threshold_overrides_apply() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GLUCOSE_LOW", "70"),
            ("GLUCOSE_HIGH", "180"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.thresholds, Some(Thresholds::new(70.0, 180.0)));
        assert_eq!(config.port, 9000);
        assert_eq!(config.alert_series().and_then(|s| s.label), Some(GLUCOSE));
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_VARIANT", "pro")])).unwrap_err();
        assert_eq!(err.to_string(), "unknown variant: pro");

        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("GLUCOSE_LOW", "150"),
            ("GLUCOSE_HIGH", "100"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThresholds { .. }));
    }

    #[test]
    fn rejects_non_finite_thresholds() {
        let err = AppConfig::from_lookup(lookup_from(&[("GLUCOSE_LOW", "NaN")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for GLUCOSE_LOW: NaN");

        let err = AppConfig::from_lookup(lookup_from(&[("GLUCOSE_HIGH", "inf")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "GLUCOSE_HIGH", .. }
        ));
    }
}
