// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout compliance: matches device laps to planned workout steps and
//! scores how closely each step's pace hit its target.
//!
//! Matching is a single left-to-right sweep over the laps. Each step takes
//! laps from where the previous step stopped, so a lap is never counted twice
//! and the steps cannot be matched independently of one another.

use tracing::{debug, warn};

use super::format::{format_pace, format_step_type};
use crate::config::{AnalysisConfig, ComplianceConfig};
use crate::constants::compliance::{HIT_POINTS, PARTIAL_POINTS};
use crate::models::{
    DistanceStatus, FormattedPaceRange, Lap, PaceCompliance, PaceRange, StepCompliance,
    StepStatus, WorkoutComplianceResult, WorkoutPlan, WorkoutStep,
};
use crate::telemetry::extractor::derive_pace;

/// Forward-only position in the lap sequence
struct LapCursor<'a> {
    laps: &'a [Lap],
    position: usize,
}

impl<'a> LapCursor<'a> {
    fn new(laps: &'a [Lap]) -> Self {
        Self { laps, position: 0 }
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.laps.len()
    }

    fn next_lap(&mut self) -> Option<&'a Lap> {
        let lap = self.laps.get(self.position)?;
        self.position += 1;
        Some(lap)
    }
}

/// Laps taken for one step
#[derive(Debug, Default)]
struct LapAccumulation {
    distance_m: f64,
    duration_sec: f64,
    laps_used: Vec<u32>,
}

impl LapAccumulation {
    fn take(&mut self, lap: &Lap) {
        self.distance_m += lap.distance_m;
        self.duration_sec += lap.duration_sec;
        self.laps_used.push(lap.lap_number);
    }
}

/// Scores activities against structured workout plans
#[derive(Debug, Clone)]
pub struct ComplianceMatcher {
    config: ComplianceConfig,
}

impl ComplianceMatcher {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.compliance.clone(),
        }
    }

    /// Overall compliance of `laps` against `plan`
    ///
    /// `None` when the plan has no actionable steps or no step could be matched,
    /// for example because there are no laps.
    pub fn evaluate(
        &self,
        plan: &WorkoutPlan,
        laps: &[Lap],
        total_distance_m: f64,
        total_duration_sec: f64,
    ) -> Option<WorkoutComplianceResult> {
        let breakdown = self.map_laps_to_steps(&plan.steps, laps, total_distance_m, total_duration_sec);
        if breakdown.is_empty() {
            debug!(workout = %plan.name, "No steps matched, skipping compliance");
            return None;
        }

        let steps_hit = count_status(&breakdown, |s| s == StepStatus::Hit);
        let steps_partial = count_status(&breakdown, |s| {
            matches!(s, StepStatus::Partial | StepStatus::Fast)
        });
        let steps_missed = count_status(&breakdown, |s| s == StepStatus::Missed);
        let total_steps = breakdown.len();

        let points = steps_hit as u32 * HIT_POINTS + steps_partial as u32 * PARTIAL_POINTS;
        // f64::round rounds halves away from zero, so 62.5 scores 63
        let compliance_percent = (f64::from(points) / total_steps as f64).round().min(100.0) as u8;

        let target_distance_m = plan.estimated_distance_m.filter(|d| *d > 0.0);

        Some(WorkoutComplianceResult {
            workout_name: plan.name.clone(),
            workout_description: plan.description.clone(),
            compliance_percent,
            steps_hit,
            steps_partial,
            steps_missed,
            total_steps,
            distance_status: self.distance_status(target_distance_m, total_distance_m),
            target_distance_m,
            actual_distance_m: total_distance_m,
            step_breakdown: breakdown,
        })
    }

    /// Match laps to the plan's actionable steps in order
    ///
    /// Steps left over once the laps run out are not reported.
    pub fn map_laps_to_steps(
        &self,
        steps: &[WorkoutStep],
        laps: &[Lap],
        total_distance_m: f64,
        total_duration_sec: f64,
    ) -> Vec<StepCompliance> {
        let actionable: Vec<&WorkoutStep> = steps.iter().filter(|s| !s.is_repeat()).collect();
        if actionable.is_empty() || laps.is_empty() {
            return Vec::new();
        }

        let single_step = actionable.len() == 1;
        let mut cursor = LapCursor::new(laps);
        let mut results = Vec::with_capacity(actionable.len());

        for (index, step) in actionable.iter().enumerate() {
            if cursor.is_exhausted() {
                debug!(remaining = actionable.len() - index, "Laps exhausted before plan ended");
                break;
            }

            let is_last = index + 1 == actionable.len();
            let mut accumulated = self.accumulate_laps(step, &mut cursor, is_last || single_step);
            if accumulated.laps_used.is_empty() {
                continue;
            }

            // Unstructured single-segment runs are often not lap-split by the
            // device, so the laps can miss part of the activity
            if single_step
                && total_distance_m > 0.0
                && total_duration_sec > 0.0
                && accumulated.distance_m < total_distance_m * self.config.single_step_coverage_ratio
            {
                warn!(
                    lap_distance_m = accumulated.distance_m,
                    total_distance_m,
                    "Laps cover too little of a single-step workout, using session totals"
                );
                accumulated.distance_m = total_distance_m;
                accumulated.duration_sec = total_duration_sec;
            }

            let compliance = self.score_step(step, accumulated);
            debug!(
                step = %compliance.raw_step_type,
                laps = ?compliance.laps_used,
                pace = compliance.actual_pace_sec_per_km,
                status = ?compliance.status,
                "Matched workout step"
            );
            results.push(compliance);
        }

        results
    }

    fn accumulate_laps(
        &self,
        step: &WorkoutStep,
        cursor: &mut LapCursor<'_>,
        consume_all: bool,
    ) -> LapAccumulation {
        let mut accumulated = LapAccumulation::default();

        if let Some(target) = step.distance_target() {
            while let Some(lap) = cursor.next_lap() {
                accumulated.take(lap);
                if !consume_all
                    && accumulated.distance_m >= target * self.config.distance_accumulation_ratio
                {
                    break;
                }
            }
        } else if let Some(target) = step.duration_target() {
            // The loop guard and the break use different ratios; the break
            // fires first, so accumulation effectively stops at the break ratio
            while accumulated.duration_sec < target * self.config.duration_loop_ratio {
                let Some(lap) = cursor.next_lap() else {
                    break;
                };
                accumulated.take(lap);
                if accumulated.duration_sec >= target * self.config.duration_break_ratio {
                    break;
                }
            }
        } else if let Some(lap) = cursor.next_lap() {
            accumulated.take(lap);
        }

        accumulated
    }

    fn score_step(&self, step: &WorkoutStep, accumulated: LapAccumulation) -> StepCompliance {
        let pace = derive_pace(accumulated.distance_m, accumulated.duration_sec);
        let range = step.target_pace_range.filter(PaceRange::is_usable);
        let (pace_compliance, status) = match range {
            Some(range) if pace > 0.0 => self.classify_pace(pace, &range),
            _ => (None, StepStatus::NoTarget),
        };

        StepCompliance {
            step_type: format_step_type(&step.step_type),
            raw_step_type: step.step_type.clone(),
            actual_pace_sec_per_km: pace,
            actual_pace: (pace > 0.0).then(|| format_pace(pace)),
            actual_distance_m: accumulated.distance_m,
            actual_duration_sec: accumulated.duration_sec,
            laps_used: accumulated.laps_used,
            pace_compliance,
            status,
            target_pace_range: range.map(|r| FormattedPaceRange {
                slow: format_pace(r.slow_sec_per_km),
                fast: format_pace(r.fast_sec_per_km),
            }),
            target_distance_m: step.distance_target(),
            target_duration_sec: step.duration_target(),
        }
    }

    /// Running faster than the range is reported separately rather than
    /// penalized; the slow end gets a tolerance band
    fn classify_pace(&self, pace: f64, range: &PaceRange) -> (Option<PaceCompliance>, StepStatus) {
        if pace >= range.fast_sec_per_km && pace <= range.slow_sec_per_km {
            (Some(PaceCompliance::Hit), StepStatus::Hit)
        } else if pace < range.fast_sec_per_km {
            (Some(PaceCompliance::Fast), StepStatus::Fast)
        } else if pace <= range.slow_sec_per_km * self.config.slow_tolerance_ratio {
            (Some(PaceCompliance::Close), StepStatus::Partial)
        } else {
            (Some(PaceCompliance::Slow), StepStatus::Missed)
        }
    }

    fn distance_status(&self, target_m: Option<f64>, actual_m: f64) -> Option<DistanceStatus> {
        let target = target_m?;
        let diff_pct = (actual_m - target).abs() / target * 100.0;
        Some(if diff_pct <= self.config.distance_tolerance_pct {
            DistanceStatus::Hit
        } else if actual_m < target {
            DistanceStatus::Short
        } else {
            DistanceStatus::Long
        })
    }
}

impl Default for ComplianceMatcher {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

fn count_status(breakdown: &[StepCompliance], predicate: impl Fn(StepStatus) -> bool) -> usize {
    breakdown.iter().filter(|s| predicate(s.status)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(lap_number: u32, distance_m: f64, duration_sec: f64) -> Lap {
        Lap {
            lap_number,
            distance_m,
            duration_sec,
            avg_pace_sec_per_km: derive_pace(distance_m, duration_sec),
            avg_heart_rate: None,
            avg_cadence: None,
            avg_ground_contact_ms: None,
        }
    }

    fn step(step_type: &str) -> WorkoutStep {
        WorkoutStep {
            step_type: step_type.to_string(),
            target_distance_m: None,
            target_duration_sec: None,
            target_pace_range: None,
        }
    }

    fn distance_step(distance_m: f64, slow: f64, fast: f64) -> WorkoutStep {
        WorkoutStep {
            target_distance_m: Some(distance_m),
            target_pace_range: Some(PaceRange {
                slow_sec_per_km: slow,
                fast_sec_per_km: fast,
            }),
            ..step("interval")
        }
    }

    fn plan(steps: Vec<WorkoutStep>, estimated_distance_m: Option<f64>) -> WorkoutPlan {
        WorkoutPlan {
            name: "Quality Session".to_string(),
            description: String::new(),
            estimated_distance_m,
            steps,
        }
    }

    #[test]
    fn test_pace_classification() {
        let matcher = ComplianceMatcher::default();
        let range = PaceRange {
            slow_sec_per_km: 300.0,
            fast_sec_per_km: 280.0,
        };

        assert_eq!(matcher.classify_pace(280.0, &range).1, StepStatus::Hit);
        assert_eq!(matcher.classify_pace(300.0, &range).1, StepStatus::Hit);
        assert_eq!(matcher.classify_pace(279.0, &range).1, StepStatus::Fast);
        assert_eq!(matcher.classify_pace(315.0, &range).1, StepStatus::Partial);
        assert_eq!(
            matcher.classify_pace(315.0, &range).0,
            Some(PaceCompliance::Close)
        );
        assert_eq!(matcher.classify_pace(316.0, &range).1, StepStatus::Missed);
    }

    #[test]
    fn test_mixed_outcomes_score_63() {
        let matcher = ComplianceMatcher::default();
        let workout = plan(
            vec![
                distance_step(1000.0, 310.0, 290.0),
                distance_step(1000.0, 310.0, 290.0),
                distance_step(1000.0, 290.0, 280.0),
                distance_step(1000.0, 250.0, 240.0),
            ],
            None,
        );
        let laps: Vec<Lap> = (1..=4).map(|n| lap(n, 1000.0, 300.0)).collect();

        let result = matcher.evaluate(&workout, &laps, 4000.0, 1200.0).unwrap();
        let statuses: Vec<StepStatus> = result.step_breakdown.iter().map(|s| s.status).collect();

        assert_eq!(
            statuses,
            vec![
                StepStatus::Hit,
                StepStatus::Hit,
                StepStatus::Partial,
                StepStatus::Missed
            ]
        );
        assert_eq!(result.compliance_percent, 63);
        assert_eq!(result.steps_hit, 2);
        assert_eq!(result.steps_partial, 1);
        assert_eq!(result.steps_missed, 1);
        assert_eq!(result.total_steps, 4);
        assert_eq!(result.distance_status, None);
    }

    #[test]
    fn test_distance_step_stops_at_ninety_percent() {
        let matcher = ComplianceMatcher::default();
        let steps = vec![
            distance_step(2000.0, 310.0, 290.0),
            distance_step(1000.0, 310.0, 290.0),
        ];
        let laps = vec![
            lap(1, 1000.0, 300.0),
            lap(2, 800.0, 240.0),
            lap(3, 500.0, 150.0),
            lap(4, 500.0, 150.0),
        ];

        let breakdown = matcher.map_laps_to_steps(&steps, &laps, 2800.0, 840.0);

        // 1800 m reaches 90% of 2000 m
        assert_eq!(breakdown[0].laps_used, vec![1, 2]);
        // The last step takes everything that is left
        assert_eq!(breakdown[1].laps_used, vec![3, 4]);
        assert_eq!(breakdown[1].actual_distance_m, 1000.0);
    }

    #[test]
    fn test_duration_step_breaks_at_eighty_percent() {
        let matcher = ComplianceMatcher::default();
        let duration_step = WorkoutStep {
            target_duration_sec: Some(600.0),
            ..step("warmup")
        };
        let steps = vec![duration_step, step("cooldown")];
        let laps = vec![lap(1, 1500.0, 500.0), lap(2, 300.0, 100.0), lap(3, 300.0, 100.0)];

        let breakdown = matcher.map_laps_to_steps(&steps, &laps, 2100.0, 700.0);

        // 500 s is below the 540 s loop guard but past the 480 s break
        assert_eq!(breakdown[0].laps_used, vec![1]);
        assert_eq!(breakdown[0].step_type, "Warmup");
        assert_eq!(breakdown[0].target_duration_sec, Some(600.0));
        assert_eq!(breakdown[1].laps_used, vec![2]);
    }

    #[test]
    fn test_untargeted_steps_take_one_lap_each_and_repeats_are_skipped() {
        let matcher = ComplianceMatcher::default();
        let steps = vec![step("warmup"), step("repeat"), step("run"), step("cooldown")];
        let laps = vec![lap(1, 1000.0, 360.0), lap(2, 1000.0, 300.0)];

        let breakdown = matcher.map_laps_to_steps(&steps, &laps, 2000.0, 660.0);

        // Two laps for three actionable steps: the cooldown never appears
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].laps_used, vec![1]);
        assert_eq!(breakdown[1].laps_used, vec![2]);
        assert_eq!(breakdown[1].raw_step_type, "run");
        assert!(breakdown.iter().all(|s| s.status == StepStatus::NoTarget));
        assert!(breakdown.iter().all(|s| s.pace_compliance.is_none()));
    }

    #[test]
    fn test_no_target_steps_count_toward_total() {
        let matcher = ComplianceMatcher::default();
        let workout = plan(
            vec![step("warmup"), distance_step(1000.0, 310.0, 290.0)],
            Some(2000.0),
        );
        let laps = vec![lap(1, 1000.0, 360.0), lap(2, 1000.0, 300.0)];

        let result = matcher.evaluate(&workout, &laps, 2000.0, 660.0).unwrap();
        assert_eq!(result.total_steps, 2);
        assert_eq!(result.compliance_percent, 50);
        assert_eq!(result.distance_status, Some(DistanceStatus::Hit));
    }

    #[test]
    fn test_single_step_uses_session_totals_when_laps_fall_short() {
        let matcher = ComplianceMatcher::default();
        let workout = plan(vec![distance_step(5000.0, 330.0, 290.0)], Some(5000.0));
        let laps = vec![lap(1, 2000.0, 640.0), lap(2, 2000.0, 620.0)];

        let result = matcher.evaluate(&workout, &laps, 5050.0, 1500.0).unwrap();
        let only = &result.step_breakdown[0];

        assert_eq!(only.actual_distance_m, 5050.0);
        assert_eq!(only.actual_duration_sec, 1500.0);
        assert_eq!(only.laps_used, vec![1, 2]);
        assert!((only.actual_pace_sec_per_km - 297.03).abs() < 0.01);
        assert_eq!(only.status, StepStatus::Hit);
        assert_eq!(result.compliance_percent, 100);
        assert_eq!(result.distance_status, Some(DistanceStatus::Hit));
    }

    #[test]
    fn test_single_step_keeps_laps_when_they_cover_the_run() {
        let matcher = ComplianceMatcher::default();
        let workout = plan(vec![distance_step(5000.0, 330.0, 290.0)], Some(5000.0));
        let laps = vec![lap(1, 2500.0, 750.0), lap(2, 2450.0, 735.0)];

        let result = matcher.evaluate(&workout, &laps, 5000.0, 1500.0).unwrap();
        assert_eq!(result.step_breakdown[0].actual_distance_m, 4950.0);
        assert_eq!(result.step_breakdown[0].actual_duration_sec, 1485.0);
    }

    #[test]
    fn test_distance_verdicts() {
        let matcher = ComplianceMatcher::default();
        assert_eq!(matcher.distance_status(Some(10000.0), 9100.0), Some(DistanceStatus::Hit));
        assert_eq!(matcher.distance_status(Some(10000.0), 8900.0), Some(DistanceStatus::Short));
        assert_eq!(matcher.distance_status(Some(10000.0), 11500.0), Some(DistanceStatus::Long));
        assert_eq!(matcher.distance_status(None, 11500.0), None);
    }

    #[test]
    fn test_nothing_to_match_yields_none() {
        let matcher = ComplianceMatcher::default();
        let laps = vec![lap(1, 1000.0, 300.0)];

        let empty_plan = plan(Vec::new(), Some(1000.0));
        assert!(matcher.evaluate(&empty_plan, &laps, 1000.0, 300.0).is_none());

        let repeats_only = plan(vec![step("repeat")], Some(1000.0));
        assert!(matcher.evaluate(&repeats_only, &laps, 1000.0, 300.0).is_none());

        let real_plan = plan(vec![distance_step(1000.0, 310.0, 290.0)], Some(1000.0));
        assert!(matcher.evaluate(&real_plan, &[], 1000.0, 300.0).is_none());
    }

    #[test]
    fn test_unmeasurable_pace_has_no_target() {
        let matcher = ComplianceMatcher::default();
        let paced_only = WorkoutStep {
            target_pace_range: Some(PaceRange {
                slow_sec_per_km: 310.0,
                fast_sec_per_km: 290.0,
            }),
            ..step("interval")
        };
        let steps = vec![paced_only, distance_step(1000.0, 310.0, 290.0)];
        let laps = vec![lap(1, 0.0, 300.0), lap(2, 1000.0, 300.0)];

        let breakdown = matcher.map_laps_to_steps(&steps, &laps, 1000.0, 600.0);
        assert_eq!(breakdown[0].actual_pace_sec_per_km, 0.0);
        assert_eq!(breakdown[0].actual_pace, None);
        assert_eq!(breakdown[0].status, StepStatus::NoTarget);
        assert_eq!(breakdown[1].status, StepStatus::Hit);
    }
}
