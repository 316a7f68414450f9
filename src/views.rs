//! Chart-ready summaries derived from the full record set.
//!
//! Everything here is pure: callers fetch records from the store and pass them in.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::LearningRecord;

/// Total minutes per topic, smallest total first. Totals saturate at the
/// `i64` bounds instead of overflowing.
///
/// Groups are built in topic-name order and then stable-sorted by total, so
/// topics with equal totals stay alphabetical.
pub fn duration_by_topic(records: &[LearningRecord]) -> Vec<(String, i64)> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for record in records {
        let total = totals.entry(record.topic.as_str()).or_insert(0);
        *total = total.saturating_add(record.duration_min);
    }

    let mut grouped: Vec<(String, i64)> = totals
        .into_iter()
        .map(|(topic, total)| (topic.to_string(), total))
        .collect();
    grouped.sort_by_key(|(_, total)| *total);
    grouped
}

/// Number of records per learning mode.
pub fn learning_mode_distribution(records: &[LearningRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.learning_mode.clone()).or_insert(0) += 1;
    }
    counts
}

/// Completion-rate samples for each focus level, in input order.
pub fn focus_vs_completion(records: &[LearningRecord]) -> BTreeMap<i64, Vec<f64>> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.focus_level)
            .or_default()
            .push(record.completion_rate);
    }
    groups
}

/// One `(focus_level, duration_min)` point per record, ordered by focus level.
/// Records with the same focus level keep their input order.
pub fn focus_vs_duration(records: &[LearningRecord]) -> Vec<(i64, i64)> {
    let mut points: Vec<(i64, i64)> = records
        .iter()
        .map(|r| (r.focus_level, r.duration_min))
        .collect();
    points.sort_by_key(|(focus, _)| *focus);
    points
}

/// Five-number summary for a box plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

// Linear interpolation between closest ranks; `sorted` must be non-empty
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// The four dashboard views computed from one fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardViews {
    pub duration_by_topic: Vec<(String, i64)>,
    pub learning_mode_distribution: BTreeMap<String, usize>,
    pub focus_vs_completion: BTreeMap<i64, Vec<f64>>,
    pub focus_vs_duration: Vec<(i64, i64)>,
}

impl DashboardViews {
    pub fn from_records(records: &[LearningRecord]) -> Self {
        Self {
            duration_by_topic: duration_by_topic(records),
            learning_mode_distribution: learning_mode_distribution(records),
            focus_vs_completion: focus_vs_completion(records),
            focus_vs_duration: focus_vs_duration(records),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.focus_vs_duration.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.focus_vs_duration.len()
    }

    pub fn completion_summaries(&self) -> Vec<(i64, BoxSummary)> {
        self.focus_vs_completion
            .iter()
            .filter_map(|(focus, samples)| BoxSummary::from_samples(samples).map(|s| (*focus, s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_record;

    fn record(
        serial_no: i64,
        topic: &str,
        duration_min: i64,
        learning_mode: &str,
        focus_level: i64,
        completion_rate: f64,
    ) -> LearningRecord {
        LearningRecord {
            topic: topic.to_string(),
            duration_min,
            learning_mode: learning_mode.to_string(),
            focus_level,
            completion_rate,
            ..sample_record(serial_no)
        }
    }

    fn math_pair() -> Vec<LearningRecord> {
        vec![
            record(1, "Math", 30, "Online", 3, 80.0),
            record(2, "Math", 20, "Offline", 5, 90.0),
        ]
    }

    fn mixed() -> Vec<LearningRecord> {
        vec![
            record(1, "Rust", 60, "Online", 4, 70.0),
            record(2, "Math", 15, "Offline", 2, 40.0),
            record(3, "Rust", 30, "Online", 2, 55.0),
            record(4, "Art", 45, "Hybrid", 4, 95.0),
            record(5, "Math", 10, "Online", 1, 20.0),
        ]
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn math_pair_views() {
            let records = math_pair();

            assert_eq!(duration_by_topic(&records), vec![("Math".to_string(), 50)]);

            let modes = learning_mode_distribution(&records);
            assert_eq!(modes.len(), 2);
            assert_eq!(modes["Online"], 1);
            assert_eq!(modes["Offline"], 1);

            assert_eq!(focus_vs_duration(&records), vec![(3, 30), (5, 20)]);

            let completion = focus_vs_completion(&records);
            assert_eq!(completion[&3], vec![80.0]);
            assert_eq!(completion[&5], vec![90.0]);
        }

        #[test]
        fn empty_input_gives_empty_views() {
            let views = DashboardViews::from_records(&[]);
            assert!(views.duration_by_topic.is_empty());
            assert!(views.learning_mode_distribution.is_empty());
            assert!(views.focus_vs_completion.is_empty());
            assert!(views.focus_vs_duration.is_empty());
            assert!(views.completion_summaries().is_empty());
            assert!(views.is_empty());
        }
    }

    mod duration_tests {
        use super::*;

        #[test]
        fn sorted_ascending_by_total() {
            let totals = duration_by_topic(&mixed());
            assert_eq!(
                totals,
                vec![
                    ("Math".to_string(), 25),
                    ("Art".to_string(), 45),
                    ("Rust".to_string(), 90),
                ]
            );
        }

        #[test]
        fn totals_sum_to_input_duration() {
            let records = mixed();
            let total: i64 = duration_by_topic(&records).iter().map(|(_, t)| t).sum();
            let expected: i64 = records.iter().map(|r| r.duration_min).sum();
            assert_eq!(total, expected);
        }

        #[test]
        fn huge_durations_saturate() {
            let records = vec![
                record(1, "Math", i64::MAX, "Online", 1, 1.0),
                record(2, "Math", 10, "Online", 1, 1.0),
                record(3, "Debt", i64::MIN, "Online", 1, 1.0),
                record(4, "Debt", -1, "Online", 1, 1.0),
            ];
            assert_eq!(
                duration_by_topic(&records),
                vec![("Debt".to_string(), i64::MIN), ("Math".to_string(), i64::MAX)]
            );
            assert!(!DashboardViews::from_records(&records).is_empty());
        }

        #[test]
        fn ties_keep_topic_name_order() {
            let records = vec![
                record(1, "Zoology", 10, "Online", 1, 1.0),
                record(2, "Algebra", 10, "Online", 1, 1.0),
                record(3, "Music", 5, "Online", 1, 1.0),
            ];
            let topics: Vec<String> = duration_by_topic(&records)
                .into_iter()
                .map(|(t, _)| t)
                .collect();
            assert_eq!(topics, vec!["Music", "Algebra", "Zoology"]);
        }
    }

    mod mode_tests {
        use super::*;

        #[test]
        fn counts_sum_to_record_count() {
            let records = mixed();
            let counts = learning_mode_distribution(&records);
            assert_eq!(counts.values().sum::<usize>(), records.len());
            assert_eq!(counts["Online"], 3);
            assert_eq!(counts["Hybrid"], 1);
        }
    }

    mod focus_tests {
        use super::*;

        #[test]
        fn focus_vs_duration_keeps_every_record() {
            let records = mixed();
            let points = focus_vs_duration(&records);
            assert_eq!(points.len(), records.len());
            assert!(points.windows(2).all(|w| w[0].0 <= w[1].0));
        }

        #[test]
        fn focus_vs_duration_is_stable() {
            let points = focus_vs_duration(&mixed());
            // Focus 2 appears as Math(15) then Rust(30); focus 4 as Rust(60) then Art(45)
            assert_eq!(points, vec![(1, 10), (2, 15), (2, 30), (4, 60), (4, 45)]);
        }

        #[test]
        fn focus_vs_completion_groups_samples() {
            let groups = focus_vs_completion(&mixed());
            assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 2, 4]);
            assert_eq!(groups[&2], vec![40.0, 55.0]);
            assert_eq!(groups[&4], vec![70.0, 95.0]);
            let samples: usize = groups.values().map(Vec::len).sum();
            assert_eq!(samples, 5);
        }
    }

    mod box_summary_tests {
        use super::*;

        #[test]
        fn no_samples_no_summary() {
            assert!(BoxSummary::from_samples(&[]).is_none());
        }

        #[test]
        fn single_sample_collapses() {
            let s = BoxSummary::from_samples(&[42.0]).unwrap();
            assert_eq!(s.min, 42.0);
            assert_eq!(s.q1, 42.0);
            assert_eq!(s.median, 42.0);
            assert_eq!(s.q3, 42.0);
            assert_eq!(s.max, 42.0);
        }

        #[test]
        fn interpolates_quartiles() {
            let s = BoxSummary::from_samples(&[40.0, 10.0, 30.0, 20.0]).unwrap();
            assert_eq!(s.min, 10.0);
            assert_eq!(s.q1, 17.5);
            assert_eq!(s.median, 25.0);
            assert_eq!(s.q3, 32.5);
            assert_eq!(s.max, 40.0);
        }

        #[test]
        fn dashboard_summaries_follow_focus_order() {
            let views = DashboardViews::from_records(&mixed());
            let levels: Vec<i64> = views.completion_summaries().iter().map(|(f, _)| *f).collect();
            assert_eq!(levels, vec![1, 2, 4]);
            assert_eq!(views.record_count(), 5);
        }
    }
}
