// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parallel analysis of several activities with plans looked up on disk

use anyhow::Result;
use runform::config;
use runform::intelligence::analyzer::activity_id_for;
use runform::intelligence::{ActivityAnalyzer, AnalysisError, AnalysisJob};
use runform::models::Grade;
use runform::providers::{FilePlanSource, PlanQuery, PlanSource};
use runform::telemetry::TelemetryError;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

async fn write_activity(dir: &Path, name: &str, distance_m: f64, duration_sec: f64) -> Result<PathBuf> {
    let lines = [
        json!({"kind": "session", "total_distance": distance_m, "total_elapsed_time": duration_sec}),
        json!({"kind": "record", "timestamp": "2026-01-08T07:15:00", "heart_rate": 150, "cadence": 81.0}),
        json!({"kind": "lap", "total_distance": distance_m, "total_elapsed_time": duration_sec}),
    ];
    let body: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    let path = dir.join(format!("{name}.jsonl"));
    tokio::fs::write(&path, body.join("\n")).await?;
    Ok(path)
}

#[tokio::test]
async fn test_batch_keeps_job_order_and_isolates_failures() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let plans = temp_dir.path().join("plans");
    tokio::fs::create_dir(&plans).await?;
    tokio::fs::write(
        plans.join("21487950438.json"),
        json!({
            "name": "Easy 5K",
            "estimatedDistanceM": 5000,
            "steps": [{"type": "run", "targetDistanceM": 5000,
                       "targetPaceRange": {"slowSecPerKm": 360, "fastSecPerKm": 300}}]
        })
        .to_string(),
    )
    .await?;

    let planned = write_activity(temp_dir.path(), "2026-01-08_Easy_Run_21487950438", 5000.0, 1650.0).await?;
    let unplanned = write_activity(temp_dir.path(), "shakeout", 3000.0, 1080.0).await?;
    let missing = temp_dir.path().join("missing.jsonl");

    let source = FilePlanSource::new(plans);
    let mut jobs = Vec::new();
    for path in [planned, missing, unplanned] {
        let plan = source.scheduled_workout(&PlanQuery::new(activity_id_for(&path)))?;
        jobs.push(AnalysisJob { path, plan });
    }

    let analyzer = ActivityAnalyzer::default();
    let outcomes = analyzer.analyze_batch(jobs).await;

    assert_eq!(outcomes.len(), 3);

    let planned_report = outcomes[0].result.as_ref().expect("planned run analyzed");
    let compliance = planned_report.workout_compliance.as_ref().expect("plan applied");
    assert_eq!(compliance.workout_name, "Easy 5K");
    assert_eq!(compliance.compliance_percent, 100);

    assert!(outcomes[1].path.ends_with("missing.jsonl"));
    assert!(matches!(
        outcomes[1].result,
        Err(AnalysisError::Telemetry(TelemetryError::NotFound { .. }))
    ));

    let unplanned_report = outcomes[2].result.as_ref().expect("unplanned run analyzed");
    assert_eq!(unplanned_report.activity_id, "shakeout");
    assert!(unplanned_report.workout_compliance.is_none());
    assert_eq!(unplanned_report.summary.avg_pace_sec_per_km, 360.0);
    Ok(())
}

#[tokio::test]
async fn test_config_thresholds_change_grades() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("runform.toml");
    tokio::fs::write(
        &config_path,
        r#"
[grading.thresholds.cadence]
a = 160.0
b = 150.0
c = 140.0
"#,
    )
    .await?;
    let path = write_activity(temp_dir.path(), "masters_run", 5000.0, 1500.0).await?;

    let default_outcomes = ActivityAnalyzer::default()
        .analyze_batch(vec![AnalysisJob { path: path.clone(), plan: None }])
        .await;
    let config = config::load(Some(config_path.as_path()))?;
    let tuned_outcomes = ActivityAnalyzer::new(&config)
        .analyze_batch(vec![AnalysisJob { path, plan: None }])
        .await;

    let default_report = default_outcomes[0].result.as_ref().expect("analyzed");
    let tuned_report = tuned_outcomes[0].result.as_ref().expect("analyzed");

    assert_eq!(default_report.metrics["avgCadence"].value, 162.0);
    assert_eq!(default_report.metrics["avgCadence"].grade, Grade::C);
    assert_eq!(tuned_report.metrics["avgCadence"].grade, Grade::A);
    // No objective scale for heart rate, whatever the config says
    assert_eq!(tuned_report.metrics["avgHeartRate"].grade, Grade::B);
    Ok(())
}
