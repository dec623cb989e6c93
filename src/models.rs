// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures shared by the extractor, the metrics aggregator and the
//! compliance matcher.
//!
//! ## Design Principles
//!
//! - **Absent is not zero**: every value a device may or may not record is an
//!   `Option`, so averaging and grading only ever see values that were measured
//! - **Immutable results**: derived entities are built once and never mutated
//! - **Serializable**: all models serialize with camelCase keys for the calling
//!   presentation layer
//!
//! ## Core Models
//!
//! - [`Sample`]: one normalized per-second telemetry record
//! - [`Lap`]: one device lap with derived pace
//! - [`ActivitySummary`]: session totals
//! - [`GradedMetric`] / [`FatigueComparisonEntry`]: aggregator output
//! - [`WorkoutPlan`] / [`WorkoutStep`]: externally supplied structured workout
//! - [`StepCompliance`] / [`WorkoutComplianceResult`]: matcher output

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::compliance::{DEFAULT_WORKOUT_NAME, REPEAT_STEP_TYPE};

/// A normalized telemetry sample
///
/// `timestamp_offset_sec` is measured from the first record's timestamp; every
/// other field is present only when the device recorded it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Seconds since the first record
    pub timestamp_offset_sec: f64,
    /// Heart rate in BPM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    /// Full (both feet) cadence in steps per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    /// Pace in seconds per kilometer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_sec_per_km: Option<f64>,
    /// Ground contact time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_contact_ms: Option<f64>,
    /// Ground contact time balance, percent on the left foot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gct_balance_pct: Option<f64>,
    /// Vertical ratio in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_ratio_pct: Option<f64>,
    /// Vertical oscillation in millimeters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_oscillation_mm: Option<f64>,
    /// Stride length in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stride_length_m: Option<f64>,
    /// Running power in watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<u32>,
}

/// A device lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    /// 1-based position in document order
    pub lap_number: u32,
    pub distance_m: f64,
    pub duration_sec: f64,
    /// Derived from distance and duration, 0 when either is 0
    pub avg_pace_sec_per_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_ground_contact_ms: Option<f64>,
}

/// Session-level totals for one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Session start as an ISO-8601 UTC timestamp
    pub start_time_iso: Option<String>,
    pub total_distance_m: f64,
    pub total_duration_sec: f64,
    pub avg_pace_sec_per_km: f64,
    pub avg_heart_rate: Option<u32>,
    pub activity_name: String,
    pub activity_type: String,
}

/// Everything the extractor derives from one message stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedActivity {
    pub summary: ActivitySummary,
    pub samples: Vec<Sample>,
    pub laps: Vec<Lap>,
    pub has_running_dynamics: bool,
}

/// Letter grade for a biomechanics metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(letter)
    }
}

/// A metric mean paired with its grade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradedMetric {
    pub value: f64,
    pub grade: Grade,
}

/// Direction of a first-half to second-half change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Improved,
    Degraded,
    Stable,
}

/// One metric's first-half versus second-half comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueComparisonEntry {
    /// Display label, e.g. "Ground Contact Time"
    pub metric: String,
    pub first_half: f64,
    pub second_half: f64,
    pub change_pct: f64,
    pub direction: ChangeDirection,
}

/// Target pace bounds in seconds per kilometer
///
/// `fast_sec_per_km` is the smaller number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceRange {
    pub slow_sec_per_km: f64,
    pub fast_sec_per_km: f64,
}

impl PaceRange {
    /// Both bounds must be positive for the range to be a usable target
    pub fn is_usable(&self) -> bool {
        self.slow_sec_per_km > 0.0 && self.fast_sec_per_km > 0.0
    }
}

fn default_step_type() -> String {
    "unknown".to_string()
}

/// One step of a structured workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStep {
    /// Device step type (warmup, interval, recovery, repeat, ...)
    #[serde(rename = "type", default = "default_step_type")]
    pub step_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_duration_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pace_range: Option<PaceRange>,
}

impl WorkoutStep {
    /// Repeat steps only group other steps and are never matched against laps
    pub fn is_repeat(&self) -> bool {
        self.step_type.eq_ignore_ascii_case(REPEAT_STEP_TYPE)
    }

    /// Positive target distance, if any
    pub fn distance_target(&self) -> Option<f64> {
        self.target_distance_m.filter(|d| *d > 0.0)
    }

    /// Positive target duration, if any
    pub fn duration_target(&self) -> Option<f64> {
        self.target_duration_sec.filter(|d| *d > 0.0)
    }
}

fn default_workout_name() -> String {
    DEFAULT_WORKOUT_NAME.to_string()
}

/// A planned structured workout as supplied by an external catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    #[serde(default = "default_workout_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Planned total distance in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_distance_m: Option<f64>,
    #[serde(default)]
    pub steps: Vec<WorkoutStep>,
}

/// How a step's actual pace compares with its target range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceCompliance {
    Hit,
    Fast,
    Close,
    Slow,
}

/// Scored outcome of a matched step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Hit,
    Partial,
    Missed,
    Fast,
    NoTarget,
}

/// Formatted bounds of a step's target pace range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedPaceRange {
    pub slow: String,
    pub fast: String,
}

/// Compliance verdict for one matched workout step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCompliance {
    /// Display name of the step type
    pub step_type: String,
    /// Step type as supplied in the plan
    pub raw_step_type: String,
    /// 0 when distance or duration could not be measured
    pub actual_pace_sec_per_km: f64,
    /// `M:SS` rendering of the actual pace, absent when it is 0
    pub actual_pace: Option<String>,
    pub actual_distance_m: f64,
    pub actual_duration_sec: f64,
    pub laps_used: Vec<u32>,
    pub pace_compliance: Option<PaceCompliance>,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_pace_range: Option<FormattedPaceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_duration_sec: Option<f64>,
}

/// Whole-activity distance against the plan estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStatus {
    Hit,
    Short,
    Long,
}

/// Overall compliance of one activity against one workout plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutComplianceResult {
    pub workout_name: String,
    pub workout_description: String,
    /// Always within 0..=100
    pub compliance_percent: u8,
    pub steps_hit: usize,
    /// Steps scored as partial or fast
    pub steps_partial: usize,
    pub steps_missed: usize,
    pub total_steps: usize,
    pub distance_status: Option<DistanceStatus>,
    pub target_distance_m: Option<f64>,
    pub actual_distance_m: f64,
    pub step_breakdown: Vec<StepCompliance>,
}
