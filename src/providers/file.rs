// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout plans stored as JSON files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{catalog_id, PlanQuery, PlanSource};
use crate::intelligence::AnalysisError;
use crate::models::WorkoutPlan;

impl WorkoutPlan {
    /// Load a plan from a JSON file
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let content = fs::read_to_string(path)
            .map_err(|e| AnalysisError::InvalidPlan(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
            .map_err(|e| AnalysisError::InvalidPlan(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Directory of `<activity id>.json` plan files
///
/// Falls back to the catalog id embedded in the activity id, so a plan saved as
/// `21487950438.json` also serves `2026-01-08_Quality_Session_21487950438`.
#[derive(Debug, Clone)]
pub struct FilePlanSource {
    directory: PathBuf,
}

impl FilePlanSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn candidates(&self, activity_id: &str) -> Vec<PathBuf> {
        let mut candidates = vec![self.directory.join(format!("{activity_id}.json"))];
        if let Some(id) = catalog_id(activity_id).filter(|id| *id != activity_id) {
            candidates.push(self.directory.join(format!("{id}.json")));
        }
        candidates
    }
}

impl PlanSource for FilePlanSource {
    fn scheduled_workout(&self, query: &PlanQuery) -> Result<Option<WorkoutPlan>, AnalysisError> {
        for candidate in self.candidates(&query.activity_id) {
            if candidate.exists() {
                debug!(path = %candidate.display(), activity_id = %query.activity_id, "Found workout plan");
                return WorkoutPlan::load(&candidate).map(Some);
            }
        }
        debug!(activity_id = %query.activity_id, "No workout plan on disk");
        Ok(None)
    }

    fn source_name(&self) -> &'static str {
        "file"
    }
}
