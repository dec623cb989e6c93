// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Intelligence Module
//!
//! Analysis of extracted running activities.
//!
//! This module includes:
//! - Graded running-form metrics and fatigue comparison ([`metrics`])
//! - Structured-workout compliance ([`compliance`])
//! - Pace and step-type formatting ([`format`])
//! - The [`ActivityAnalyzer`] service composing all of the above

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod analyzer;
pub mod compliance;
pub mod format;
pub mod metrics;

pub use analyzer::{ActivityAnalyzer, AnalysisError, AnalysisJob, BatchOutcome};
pub use compliance::ComplianceMatcher;
pub use format::{format_pace, format_step_type, parse_pace};
pub use metrics::{MetricsAggregator, MetricsReport, TrackedMetric};

use crate::models::{
    ActivitySummary, FatigueComparisonEntry, GradedMetric, Lap, Sample, WorkoutComplianceResult,
};

/// Complete analysis of one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub activity_id: String,
    pub summary: ActivitySummary,

    /// Graded metric means keyed by metric (`avgCadence`, `avgGct`, ...)
    pub metrics: BTreeMap<String, GradedMetric>,

    pub fatigue_comparison: Vec<FatigueComparisonEntry>,
    pub samples: Vec<Sample>,
    pub laps: Vec<Lap>,
    pub has_running_dynamics: bool,

    /// Present only when a plan was supplied and at least one step matched
    pub workout_compliance: Option<WorkoutComplianceResult>,
}
