// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Activity analyzer tying extraction, metrics and compliance together

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::compliance::ComplianceMatcher;
use super::metrics::{MetricsAggregator, MetricsReport};
use super::ActivityReport;
use crate::config::AnalysisConfig;
use crate::models::{ExtractedActivity, WorkoutComplianceResult, WorkoutPlan};
use crate::telemetry::{FitMessage, JsonLinesDecoder, MessageDecoder, TelemetryError, TelemetryExtractor};

/// Main analyzer for running activities
///
/// Built explicitly from a configuration and passed to whoever needs it; cloning
/// is cheap enough to hand one copy to each worker.
#[derive(Clone)]
pub struct ActivityAnalyzer {
    extractor: TelemetryExtractor,
    aggregator: MetricsAggregator,
    matcher: ComplianceMatcher,
    decoder: Arc<dyn MessageDecoder>,
}

/// One file to analyze, with the plan it was supposed to follow
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub path: PathBuf,
    pub plan: Option<WorkoutPlan>,
}

/// Result of one [`AnalysisJob`]
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<ActivityReport, AnalysisError>,
}

impl ActivityAnalyzer {
    /// Analyzer reading newline-delimited JSON message dumps
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_decoder(config, Arc::new(JsonLinesDecoder))
    }

    pub fn with_decoder(config: &AnalysisConfig, decoder: Arc<dyn MessageDecoder>) -> Self {
        Self {
            extractor: TelemetryExtractor::new(&config.telemetry),
            aggregator: MetricsAggregator::new(config),
            matcher: ComplianceMatcher::new(config),
            decoder,
        }
    }

    pub fn extract(&self, messages: Vec<FitMessage>) -> ExtractedActivity {
        self.extractor.extract(messages)
    }

    pub fn extract_file(&self, path: &Path) -> Result<ExtractedActivity, AnalysisError> {
        Ok(self.extractor.extract_file(self.decoder.as_ref(), path)?)
    }

    pub fn aggregate(&self, extracted: &ExtractedActivity) -> MetricsReport {
        self.aggregator.aggregate(&extracted.samples)
    }

    /// Compliance against `plan` using the activity's laps and session totals
    pub fn check_compliance(
        &self,
        plan: &WorkoutPlan,
        extracted: &ExtractedActivity,
    ) -> Option<WorkoutComplianceResult> {
        self.matcher.evaluate(
            plan,
            &extracted.laps,
            extracted.summary.total_distance_m,
            extracted.summary.total_duration_sec,
        )
    }

    /// Build the full report for an already extracted activity
    pub fn analyze(
        &self,
        activity_id: &str,
        extracted: ExtractedActivity,
        plan: Option<&WorkoutPlan>,
    ) -> ActivityReport {
        let metrics = self.aggregate(&extracted);
        let workout_compliance = plan.and_then(|p| self.check_compliance(p, &extracted));

        if plan.is_some() && workout_compliance.is_none() {
            warn!(activity_id, "Workout plan supplied but no steps could be matched");
        }

        info!(
            activity_id,
            samples = extracted.samples.len(),
            laps = extracted.laps.len(),
            compliance = workout_compliance.as_ref().map(|c| c.compliance_percent),
            "Activity analyzed"
        );

        ActivityReport {
            activity_id: activity_id.to_string(),
            summary: extracted.summary,
            metrics: metrics.graded_metrics,
            fatigue_comparison: metrics.fatigue_comparison,
            samples: extracted.samples,
            laps: extracted.laps,
            has_running_dynamics: extracted.has_running_dynamics,
            workout_compliance,
        }
    }

    /// Decode, extract and analyze one file
    ///
    /// The activity id is the file stem.
    pub fn analyze_file(
        &self,
        path: &Path,
        plan: Option<&WorkoutPlan>,
    ) -> Result<ActivityReport, AnalysisError> {
        let extracted = self.extract_file(path)?;
        Ok(self.analyze(&activity_id_for(path), extracted, plan))
    }

    /// Analyze independent activities in parallel on blocking worker threads
    ///
    /// Outcomes come back in job order; one failing file does not affect the others.
    pub async fn analyze_batch(&self, jobs: Vec<AnalysisJob>) -> Vec<BatchOutcome> {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let analyzer = self.clone();
                let path = job.path.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    analyzer.analyze_file(&job.path, job.plan.as_ref())
                });
                (path, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            let result = handle
                .await
                .unwrap_or_else(|e| Err(AnalysisError::TaskFailed(e.to_string())));
            outcomes.push(BatchOutcome { path, result });
        }
        outcomes
    }
}

impl Default for ActivityAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

/// Activity id derived from a telemetry file name
pub fn activity_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Errors that can occur during analysis
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("Invalid workout plan: {0}")]
    InvalidPlan(String),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}
