// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sources of planned workouts
//!
//! Where a plan comes from (a remote workout catalog, a calendar, a local
//! directory) does not matter to the compliance matcher; it only sees a
//! [`WorkoutPlan`]. This module is the seam for those collaborators.

use crate::intelligence::AnalysisError;
use crate::models::WorkoutPlan;

pub mod auth;
pub mod file;

pub use auth::{AuthOutcome, CatalogAuthenticator, ChallengeState, Credentials};
pub use file::FilePlanSource;

/// Identifies the activity whose plan is wanted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanQuery {
    /// Activity id, usually the telemetry file stem
    pub activity_id: String,
}

impl PlanQuery {
    pub fn new(activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
        }
    }
}

pub trait PlanSource: Send + Sync {
    /// Plan scheduled for the queried activity, if there is one
    fn scheduled_workout(&self, query: &PlanQuery) -> Result<Option<WorkoutPlan>, AnalysisError>;

    fn source_name(&self) -> &'static str;
}

/// Numeric catalog id embedded in an activity id
///
/// Accepts both a bare id (`21487950438`) and a descriptive name ending in the id
/// (`2026-01-08_New_York_-_Quality_Session_21487950438`).
pub fn catalog_id(activity_id: &str) -> Option<&str> {
    let is_id = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if is_id(activity_id) {
        return Some(activity_id);
    }
    activity_id.rsplit('_').next().filter(|last| is_id(last))
}
