// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Fixed domain constants and the default values behind [`crate::config::AnalysisConfig`].
//! Values that are policy (grading cut points, matching ratios) are only defaults here
//! and can be overridden from a config file; values that describe the telemetry
//! encoding itself are not configurable.

/// Telemetry encoding constants
pub mod telemetry {
    /// Raw cadence below this value is a single-foot (half) cadence and gets doubled.
    ///
    /// Devices do not flag which encoding they used, so the value itself is the only signal.
    pub const HALF_CADENCE_CEILING: f64 = 120.0;

    /// Stride length arrives in centimeters
    pub const CENTIMETERS_PER_METER: f64 = 100.0;

    /// Meters in a kilometer, used for every pace derivation
    pub const METERS_PER_KM: f64 = 1000.0;

    /// Share of samples that must carry GCT balance before a run counts as having
    /// running dynamics (strictly greater than)
    pub const RUNNING_DYNAMICS_RATIO: f64 = 0.5;

    /// Activity name used when the session does not name one
    pub const DEFAULT_ACTIVITY_NAME: &str = "Run";

    /// Activity type used when the session does not report a sport
    pub const DEFAULT_ACTIVITY_TYPE: &str = "running";
}

/// Grading thresholds as `(A, B, C)` cut points
pub mod grading {
    /// Steps per minute, higher is better
    pub const CADENCE: (f64, f64, f64) = (180.0, 170.0, 160.0);
    /// Ground contact time in ms, lower is better
    pub const GCT: (f64, f64, f64) = (220.0, 250.0, 280.0);
    /// Absolute deviation from a 50/50 split in %, lower is better
    pub const GCT_BALANCE: (f64, f64, f64) = (1.0, 2.0, 4.0);
    /// Vertical ratio in %, lower is better
    pub const VERTICAL_RATIO: (f64, f64, f64) = (8.0, 9.0, 10.0);

    /// Perfect left/right symmetry
    pub const BALANCE_CENTER_PCT: f64 = 50.0;
}

/// First-half/second-half fatigue comparison
pub mod fatigue {
    /// Below this many samples no comparison is made
    pub const MIN_SAMPLES: usize = 20;
    /// Changes within +/- this percentage are classified as stable
    pub const DEADBAND_PCT: f64 = 2.0;
}

/// Lap-to-step compliance matching
pub mod compliance {
    /// Distance steps stop accumulating once this share of the target is covered
    pub const DISTANCE_ACCUMULATION_RATIO: f64 = 0.9;
    /// Duration steps keep accumulating while below this share of the target
    pub const DURATION_LOOP_RATIO: f64 = 0.9;
    /// Duration steps stop as soon as this share of the target is reached
    pub const DURATION_BREAK_RATIO: f64 = 0.8;
    /// Single-step workouts fall back to session totals below this lap coverage
    pub const SINGLE_STEP_COVERAGE_RATIO: f64 = 0.95;
    /// Tolerance on the slow end of a pace range
    pub const SLOW_TOLERANCE_RATIO: f64 = 1.05;
    /// Total distance within this percentage of the plan estimate is a hit
    pub const DISTANCE_TOLERANCE_PCT: f64 = 10.0;

    /// Points awarded per step outcome
    pub const HIT_POINTS: u32 = 100;
    pub const PARTIAL_POINTS: u32 = 50;

    /// Step type that marks repeat blocks rather than work to be matched
    pub const REPEAT_STEP_TYPE: &str = "repeat";
    /// Name used when the plan does not carry one
    pub const DEFAULT_WORKOUT_NAME: &str = "Workout";
}

/// Environment-based configuration
pub mod env_config {
    use std::env;

    /// Config file name looked up in the working directory
    pub const LOCAL_CONFIG_FILE: &str = "runform.toml";

    /// Directory under the platform config dir holding `config.toml`
    pub const CONFIG_DIR_NAME: &str = "runform";

    /// Explicit config path from `RUNFORM_CONFIG`, if set
    pub fn config_path() -> Option<String> {
        env::var("RUNFORM_CONFIG").ok().filter(|p| !p.is_empty())
    }

    /// Service name reported in structured logs
    pub fn service_name() -> String {
        env::var("SERVICE_NAME").unwrap_or_else(|_| "runform".to_string())
    }
}
