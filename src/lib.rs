// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Runform
//!
//! Running-form analysis for watch telemetry. Turns decoded activity messages into
//! per-second samples, laps and a session summary, grades running-form metrics,
//! compares the first and second half of a run for fatigue, and scores how well
//! the run followed a structured workout plan.
//!
//! ## Architecture
//!
//! - **Telemetry**: message model, decoders and the extractor
//! - **Intelligence**: metric grading, fatigue comparison and workout compliance
//! - **Providers**: where workout plans come from
//! - **Models**: data shared by all of the above
//! - **Config**: grading thresholds and tolerances
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use runform::config;
//! use runform::intelligence::ActivityAnalyzer;
//! use runform::models::WorkoutPlan;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = config::load(None)?;
//!     let analyzer = ActivityAnalyzer::new(&config);
//!
//!     let plan = WorkoutPlan::load(Path::new("plans/tempo.json"))?;
//!     let report = analyzer.analyze_file(Path::new("runs/tempo.jsonl"), Some(&plan))?;
//!
//!     if let Some(compliance) = &report.workout_compliance {
//!         println!("{}: {}%", compliance.workout_name, compliance.compliance_percent);
//!     }
//!     Ok(())
//! }
//! ```

/// Configuration management
pub mod config;

/// Domain constants and default thresholds
pub mod constants;

/// Activity analysis: metrics, fatigue and compliance
pub mod intelligence;

/// Logging configuration
pub mod logging;

/// Common data models
pub mod models;

/// Workout plan sources
pub mod providers;

/// Telemetry decoding and extraction
pub mod telemetry;
