// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::Parser;
use runform::config;
use runform::intelligence::analyzer::activity_id_for;
use runform::intelligence::{ActivityAnalyzer, AnalysisJob};
use runform::logging;
use runform::models::WorkoutPlan;
use runform::providers::{FilePlanSource, PlanQuery, PlanSource};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "runform")]
#[command(author, version, about = "Analyze running activities and workout compliance", long_about = None)]
struct Args {
    /// Activity message dumps (newline-delimited JSON)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Workout plan applied to every activity
    #[arg(long, conflicts_with = "plan_dir")]
    plan: Option<PathBuf>,

    /// Directory of `<activity id>.json` workout plans
    #[arg(long)]
    plan_dir: Option<PathBuf>,

    /// Analysis config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print reports without indentation
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let config = config::load(args.config.as_deref())?;
    let analyzer = ActivityAnalyzer::new(&config);

    let shared_plan = args
        .plan
        .as_deref()
        .map(WorkoutPlan::load)
        .transpose()?;
    let plan_source = args.plan_dir.map(FilePlanSource::new);

    let mut jobs = Vec::with_capacity(args.files.len());
    for path in args.files {
        let plan = match (&shared_plan, &plan_source) {
            (Some(plan), _) => Some(plan.clone()),
            (None, Some(source)) => lookup_plan(source, &path)?,
            (None, None) => None,
        };
        jobs.push(AnalysisJob { path, plan });
    }

    info!(activities = jobs.len(), "Analyzing activities");
    let outcomes = analyzer.analyze_batch(jobs).await;

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut failures = 0usize;
    for outcome in outcomes {
        match outcome.result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                error!(path = %outcome.path.display(), "Analysis failed: {}", e);
            }
        }
    }

    let rendered = if args.compact {
        serde_json::to_string(&reports)?
    } else {
        serde_json::to_string_pretty(&reports)?
    };
    println!("{rendered}");

    if failures > 0 {
        anyhow::bail!("{} of {} activities failed", failures, failures + reports.len());
    }
    Ok(())
}

fn lookup_plan(source: &dyn PlanSource, path: &std::path::Path) -> Result<Option<WorkoutPlan>> {
    let query = PlanQuery::new(activity_id_for(path));
    source
        .scheduled_workout(&query)
        .with_context(|| format!("Failed to look up plan via {} source", source.source_name()))
}
