// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Telemetry
//!
//! Typed view of a decoded activity file and the extractor that normalizes it.
//!
//! Decoding the binary container itself is left to an external decoder; this
//! module consumes its output as a stream of [`FitMessage`] values. Each message
//! kind is a strongly typed record where every device field is optional, so a
//! field the device did not record stays distinguishable from a recorded zero.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod decoder;
pub mod error;
pub mod extractor;

pub use decoder::{JsonLinesDecoder, MessageDecoder};
pub use error::TelemetryError;
pub use extractor::TelemetryExtractor;

/// One decoded message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitMessage {
    Session(SessionMessage),
    Record(RecordMessage),
    Lap(LapMessage),
    /// Any message kind the analysis does not use (device info, events, ...)
    #[serde(other)]
    Other,
}

/// Session-level totals
///
/// Timestamps are naive: the device writes UTC without a zone marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub start_time: Option<NaiveDateTime>,
    /// Meters
    pub total_distance: Option<f64>,
    /// Seconds
    pub total_elapsed_time: Option<f64>,
    pub avg_heart_rate: Option<u32>,
    pub sport: Option<String>,
    pub name: Option<String>,
}

/// A per-second record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMessage {
    pub timestamp: Option<NaiveDateTime>,
    pub heart_rate: Option<u32>,
    /// Raw cadence, possibly half-cadence
    pub cadence: Option<f64>,
    /// m/s
    pub speed: Option<f64>,
    /// m/s
    pub enhanced_speed: Option<f64>,
    /// Ground contact time in ms
    pub stance_time: Option<f64>,
    /// Percent of contact time on the left foot
    pub stance_time_balance: Option<f64>,
    /// Percent
    pub vertical_ratio: Option<f64>,
    /// Millimeters
    pub vertical_oscillation: Option<f64>,
    /// Centimeters
    pub step_length: Option<f64>,
    /// Watts
    pub power: Option<u32>,
}

/// A device lap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LapMessage {
    /// Meters
    pub total_distance: Option<f64>,
    /// Seconds
    pub total_elapsed_time: Option<f64>,
    pub avg_heart_rate: Option<u32>,
    pub avg_running_cadence: Option<f64>,
    pub avg_cadence: Option<f64>,
    /// Ground contact time in ms
    pub avg_stance_time: Option<f64>,
}
