use crate::models::Observation;
use std::collections::BTreeMap;

/// Append-only log of observations for a single session.
///
/// Insertion order is kept as-is; anything ordered by time is a derived
/// view and never reorders the log itself.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    observations: Vec<Observation>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append<I>(&mut self, observations: I)
    where
        I: IntoIterator<Item = Observation>,
    {
        self.observations.extend(observations);
    }

    pub fn clear(&mut self) {
        self.observations.clear();
    }

    pub fn count(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn filter_by_type(&self, label: &str) -> Vec<&Observation> {
        self.observations
            .iter()
            .filter(|obs| obs.kind.as_deref() == Some(label))
            .collect()
    }

    pub fn filter_by_types(&self, labels: &[&str]) -> Vec<&Observation> {
        self.observations
            .iter()
            .filter(|obs| obs.kind.as_deref().is_some_and(|kind| labels.contains(&kind)))
            .collect()
    }

    /// Splits the log into one subset per requested label. Labels with no
    /// matching observations still get an (empty) entry.
    pub fn partition_by_type(&self, labels: &[&str]) -> BTreeMap<String, Vec<&Observation>> {
        let mut parts: BTreeMap<String, Vec<&Observation>> = labels
            .iter()
            .map(|label| (label.to_string(), Vec::new()))
            .collect();

        for obs in &self.observations {
            if let Some(kind) = obs.kind.as_deref() {
                if let Some(bucket) = parts.get_mut(kind) {
                    bucket.push(obs);
                }
            }
        }

        parts
    }

    pub fn untyped(&self) -> Vec<&Observation> {
        self.observations
            .iter()
            .filter(|obs| obs.kind.is_none())
            .collect()
    }

    pub fn latest(&self, label: Option<&str>) -> Option<&Observation> {
        match label {
            Some(label) => self
                .observations
                .iter()
                .rev()
                .find(|obs| obs.kind.as_deref() == Some(label)),
            None => self.observations.last(),
        }
    }

    pub fn sorted_view(&self, descending: bool) -> Vec<&Observation> {
        let mut view: Vec<&Observation> = self.observations.iter().collect();
        sort_by_timestamp(&mut view, descending);
        view
    }
}

/// Orders a view by timestamp. `sort_by` is stable, so equal timestamps
/// stay in insertion order.
pub fn sort_by_timestamp(view: &mut [&Observation], descending: bool) {
    if descending {
        view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    } else {
        view.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn tracker_store() -> SessionStore {
        let mut store = SessionStore::new();
        store.append([
            Observation::typed(at(8, 0), "glucose", 85.0),
            Observation::typed(at(8, 0), "insulin", 10.0),
        ]);
        store.append([
            Observation::typed(at(12, 0), "glucose", 130.0),
            Observation::typed(at(12, 0), "insulin", 12.0),
        ]);
        store
    }

    #[test]
    fn append_grows_by_batch_length() {
        let mut store = SessionStore::new();
        store.append([Observation::untyped(at(9, 0), 1.0)]);
        store.append(Vec::new());
        store.append([
            Observation::untyped(at(9, 5), 2.0),
            Observation::untyped(at(9, 6), 3.0),
        ]);
        assert_eq!(store.count(), 3);
        let values: Vec<f64> = store.iter().map(|obs| obs.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn clear_empties_every_view() {
        let mut store = tracker_store();
        store.clear();
        store.clear();
        assert!(store.is_empty());
        assert!(store.latest(None).is_none());
        assert!(store.latest(Some("glucose")).is_none());
        assert!(store.filter_by_type("glucose").is_empty());
        assert!(store.sorted_view(true).is_empty());
    }

    #[test]
    fn glucose_and_insulin_partition_typed_rows() {
        let mut store = tracker_store();
        store.append([Observation::untyped(at(13, 0), 7.0)]);

        let glucose = store.filter_by_type("glucose");
        let insulin = store.filter_by_type("insulin");
        assert_eq!(glucose.len() + insulin.len(), 4);
        assert!(glucose.iter().all(|obs| obs.kind.as_deref() == Some("glucose")));
        assert_eq!(store.untyped().len(), 1);

        let both = store.filter_by_types(&["glucose", "insulin"]);
        assert_eq!(both.len(), 4);
        assert_eq!(both[1].value, 10.0);
    }

    #[test]
    fn partition_keeps_requested_labels() {
        let store = tracker_store();
        let parts = store.partition_by_type(&["glucose", "ketones"]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts["glucose"].len(), 2);
        assert!(parts["ketones"].is_empty());
    }

    #[test]
    fn latest_respects_label() {
        let store = tracker_store();
        assert_eq!(store.latest(None).map(|obs| obs.value), Some(12.0));
        assert_eq!(store.latest(Some("glucose")).map(|obs| obs.value), Some(130.0));
        assert!(store.latest(Some("ketones")).is_none());
    }

    #[test]
    fn sorted_view_is_stable_and_read_only() {
        let mut store = SessionStore::new();
        store.append([Observation::untyped(at(10, 0), 1.0)]);
        store.append([
            Observation::typed(at(9, 0), "glucose", 2.0),
            Observation::typed(at(9, 0), "insulin", 3.0),
        ]);
        store.append([Observation::untyped(at(11, 0), 4.0)]);

        let desc: Vec<f64> = store.sorted_view(true).iter().map(|obs| obs.value).collect();
        assert_eq!(desc, vec![4.0, 1.0, 2.0, 3.0]);

        let asc: Vec<f64> = store.sorted_view(false).iter().map(|obs| obs.value).collect();
        assert_eq!(asc, vec![2.0, 3.0, 1.0, 4.0]);

        let original: Vec<f64> = store.iter().map(|obs| obs.value).collect();
        assert_eq!(original, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn filtered_subset_sorts_like_full_view() {
        let mut store = tracker_store();
        store.append([Observation::typed(at(6, 0), "ketones", 0.4)]);

        let mut subset = store.filter_by_types(&["glucose", "ketones"]);
        sort_by_timestamp(&mut subset, true);
        let values: Vec<f64> = subset.iter().map(|obs| obs.value).collect();
        assert_eq!(values, vec![130.0, 85.0, 0.4]);
    }
}
