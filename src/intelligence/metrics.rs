// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Graded running-form metrics and first-half/second-half fatigue comparison

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{AnalysisConfig, FatigueConfig, GradingConfig};
use crate::constants::grading::BALANCE_CENTER_PCT;
use crate::models::{ChangeDirection, FatigueComparisonEntry, Grade, GradedMetric, Sample};

/// Metrics graded on a lower-is-better scale; every other graded metric is
/// higher-is-better
const LOWER_IS_BETTER: [&str; 3] = ["gct", "gct_balance", "vertical_ratio"];

/// A per-sample metric the aggregator tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedMetric {
    Cadence,
    GroundContactTime,
    GctBalance,
    VerticalRatio,
    HeartRate,
}

impl TrackedMetric {
    /// Metrics reported with a grade, in output order
    pub const GRADED: [TrackedMetric; 5] = [
        TrackedMetric::Cadence,
        TrackedMetric::GroundContactTime,
        TrackedMetric::GctBalance,
        TrackedMetric::VerticalRatio,
        TrackedMetric::HeartRate,
    ];

    /// Metrics compared between the two halves of a run
    pub const FATIGUE: [TrackedMetric; 4] = [
        TrackedMetric::Cadence,
        TrackedMetric::GroundContactTime,
        TrackedMetric::VerticalRatio,
        TrackedMetric::HeartRate,
    ];

    /// Key in the graded metrics map
    pub fn key(self) -> &'static str {
        match self {
            TrackedMetric::Cadence => "avgCadence",
            TrackedMetric::GroundContactTime => "avgGct",
            TrackedMetric::GctBalance => "avgGctBalance",
            TrackedMetric::VerticalRatio => "avgVerticalRatio",
            TrackedMetric::HeartRate => "avgHeartRate",
        }
    }

    /// Name used to look up grading thresholds
    pub fn grading_name(self) -> &'static str {
        match self {
            TrackedMetric::Cadence => "cadence",
            TrackedMetric::GroundContactTime => "gct",
            TrackedMetric::GctBalance => "gct_balance",
            TrackedMetric::VerticalRatio => "vertical_ratio",
            TrackedMetric::HeartRate => "heart_rate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackedMetric::Cadence => "Cadence",
            TrackedMetric::GroundContactTime => "Ground Contact Time",
            TrackedMetric::GctBalance => "Ground Contact Balance",
            TrackedMetric::VerticalRatio => "Vertical Ratio",
            TrackedMetric::HeartRate => "Heart Rate",
        }
    }

    pub fn value(self, sample: &Sample) -> Option<f64> {
        match self {
            TrackedMetric::Cadence => sample.cadence,
            TrackedMetric::GroundContactTime => sample.ground_contact_ms,
            TrackedMetric::GctBalance => sample.gct_balance_pct,
            TrackedMetric::VerticalRatio => sample.vertical_ratio_pct,
            TrackedMetric::HeartRate => sample.heart_rate.map(f64::from),
        }
    }
}

/// Aggregator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    /// Keyed by [`TrackedMetric::key`]; metrics without data are absent
    pub graded_metrics: BTreeMap<String, GradedMetric>,
    /// Empty when the run has too few samples
    pub fatigue_comparison: Vec<FatigueComparisonEntry>,
}

/// Mean over the values that are present, `None` when nothing is
pub fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes graded metrics and fatigue comparisons from samples
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    grading: GradingConfig,
    fatigue: FatigueConfig,
}

impl MetricsAggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            grading: config.grading.clone(),
            fatigue: config.fatigue.clone(),
        }
    }

    pub fn aggregate(&self, samples: &[Sample]) -> MetricsReport {
        MetricsReport {
            graded_metrics: self.graded_metrics(samples),
            fatigue_comparison: self.fatigue_comparison(samples),
        }
    }

    /// Grade a value by metric name
    ///
    /// A metric without configured thresholds grades B.
    pub fn grade_metric(&self, metric: &str, value: f64) -> Grade {
        let Some(t) = self.grading.thresholds_for(metric) else {
            return Grade::B;
        };

        if LOWER_IS_BETTER.contains(&metric) {
            if value <= t.a {
                Grade::A
            } else if value <= t.b {
                Grade::B
            } else if value <= t.c {
                Grade::C
            } else {
                Grade::D
            }
        } else if value >= t.a {
            Grade::A
        } else if value >= t.b {
            Grade::B
        } else if value >= t.c {
            Grade::C
        } else {
            Grade::D
        }
    }

    /// Mean and grade for every tracked metric that has data
    pub fn graded_metrics(&self, samples: &[Sample]) -> BTreeMap<String, GradedMetric> {
        let mut graded = BTreeMap::new();

        for metric in TrackedMetric::GRADED {
            let Some(mean) = mean_of(samples.iter().map(|s| metric.value(s))) else {
                continue;
            };

            let grade = match metric {
                // No fitness-independent scale exists for heart rate
                TrackedMetric::HeartRate => Grade::B,
                // Symmetry matters, not which side dominates
                TrackedMetric::GctBalance => {
                    self.grade_metric(metric.grading_name(), (mean - BALANCE_CENTER_PCT).abs())
                }
                _ => self.grade_metric(metric.grading_name(), mean),
            };

            graded.insert(
                metric.key().to_string(),
                GradedMetric {
                    value: round_tenth(mean),
                    grade,
                },
            );
        }

        graded
    }

    /// Compare each half of the run
    ///
    /// The first half takes the extra sample when the count is odd. Metrics
    /// missing from either half are left out.
    pub fn fatigue_comparison(&self, samples: &[Sample]) -> Vec<FatigueComparisonEntry> {
        if samples.len() < self.fatigue.min_samples {
            debug!(
                samples = samples.len(),
                required = self.fatigue.min_samples,
                "Too few samples for fatigue comparison"
            );
            return Vec::new();
        }

        let midpoint = samples.len().div_ceil(2);
        let (first, second) = samples.split_at(midpoint);

        TrackedMetric::FATIGUE
            .iter()
            .filter_map(|&metric| {
                let first_mean = mean_of(first.iter().map(|s| metric.value(s)))?;
                let second_mean = mean_of(second.iter().map(|s| metric.value(s)))?;
                // A zero mean means the sensor reported nothing useful
                if first_mean == 0.0 || second_mean == 0.0 {
                    return None;
                }

                let change_pct = (second_mean - first_mean) / first_mean * 100.0;
                Some(FatigueComparisonEntry {
                    metric: metric.label().to_string(),
                    first_half: round_tenth(first_mean),
                    second_half: round_tenth(second_mean),
                    change_pct: round_tenth(change_pct),
                    direction: self.classify_change(change_pct),
                })
            })
            .collect()
    }

    fn classify_change(&self, change_pct: f64) -> ChangeDirection {
        if change_pct < -self.fatigue.deadband_pct {
            ChangeDirection::Improved
        } else if change_pct > self.fatigue.deadband_pct {
            ChangeDirection::Degraded
        } else {
            ChangeDirection::Stable
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
