// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tunable analysis parameters: grading cut points, fatigue deadband and
//! compliance matching ratios

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::{compliance, fatigue, grading, telemetry};

/// Main analysis configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub telemetry: TelemetryConfig,
    pub grading: GradingConfig,
    pub fatigue: FatigueConfig,
    pub compliance: ComplianceConfig,
}

/// Extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub running_dynamics_ratio: f64,
}

/// `(A, B, C)` cut points for one metric; anything beyond C is a D
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeThresholds {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl From<(f64, f64, f64)> for GradeThresholds {
    fn from((a, b, c): (f64, f64, f64)) -> Self {
        Self { a, b, c }
    }
}

/// Grading cut points keyed by metric name (`cadence`, `gct`, `gct_balance`,
/// `vertical_ratio`)
///
/// Whether higher or lower is better is a property of the metric, not of the
/// configuration. Metrics configured in a file override the built-in cut points;
/// the others keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    #[serde(deserialize_with = "merge_over_default_thresholds")]
    pub thresholds: HashMap<String, GradeThresholds>,
}

fn merge_over_default_thresholds<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, GradeThresholds>, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = HashMap::<String, GradeThresholds>::deserialize(deserializer)?;
    let mut thresholds = GradingConfig::default().thresholds;
    thresholds.extend(configured);
    Ok(thresholds)
}

/// First-half/second-half comparison parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    pub min_samples: usize,
    pub deadband_pct: f64,
}

/// Lap-to-step matching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub distance_accumulation_ratio: f64,
    pub duration_loop_ratio: f64,
    pub duration_break_ratio: f64,
    pub single_step_coverage_ratio: f64,
    pub slow_tolerance_ratio: f64,
    pub distance_tolerance_pct: f64,
}

impl AnalysisConfig {
    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read analysis config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse analysis config file: {}", path.display()))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            grading: GradingConfig::default(),
            fatigue: FatigueConfig::default(),
            compliance: ComplianceConfig::default(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            running_dynamics_ratio: telemetry::RUNNING_DYNAMICS_RATIO,
        }
    }
}

impl GradingConfig {
    pub fn thresholds_for(&self, metric: &str) -> Option<&GradeThresholds> {
        self.thresholds.get(metric)
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        let mut thresholds = HashMap::new();
        thresholds.insert("cadence".to_string(), grading::CADENCE.into());
        thresholds.insert("gct".to_string(), grading::GCT.into());
        thresholds.insert("gct_balance".to_string(), grading::GCT_BALANCE.into());
        thresholds.insert("vertical_ratio".to_string(), grading::VERTICAL_RATIO.into());
        Self { thresholds }
    }
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            min_samples: fatigue::MIN_SAMPLES,
            deadband_pct: fatigue::DEADBAND_PCT,
        }
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            distance_accumulation_ratio: compliance::DISTANCE_ACCUMULATION_RATIO,
            duration_loop_ratio: compliance::DURATION_LOOP_RATIO,
            duration_break_ratio: compliance::DURATION_BREAK_RATIO,
            single_step_coverage_ratio: compliance::SINGLE_STEP_COVERAGE_RATIO,
            slow_tolerance_ratio: compliance::SLOW_TOLERANCE_RATIO,
            distance_tolerance_pct: compliance::DISTANCE_TOLERANCE_PCT,
        }
    }
}
