// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Normalizes decoded messages into samples, laps and a session summary

use std::path::Path;

use chrono::{NaiveDateTime, SecondsFormat};
use tracing::{debug, warn};

use super::{FitMessage, LapMessage, MessageDecoder, RecordMessage, SessionMessage, TelemetryError};
use crate::config::TelemetryConfig;
use crate::constants::telemetry::{
    CENTIMETERS_PER_METER, DEFAULT_ACTIVITY_NAME, DEFAULT_ACTIVITY_TYPE, HALF_CADENCE_CEILING,
    METERS_PER_KM,
};
use crate::models::{ActivitySummary, ExtractedActivity, Lap, Sample};

/// Pace in seconds per kilometer, 0 when distance or duration is not positive
pub fn derive_pace(distance_m: f64, duration_sec: f64) -> f64 {
    if distance_m > 0.0 && duration_sec > 0.0 {
        duration_sec / (distance_m / METERS_PER_KM)
    } else {
        0.0
    }
}

/// Doubles half-cadence values
///
/// Some devices report single-foot cadence. Nothing in the stream says which
/// encoding was used, so any raw value under 120 is taken to be half-cadence.
pub fn normalize_cadence(raw: f64) -> f64 {
    if raw < HALF_CADENCE_CEILING {
        raw * 2.0
    } else {
        raw
    }
}

/// Builds [`ExtractedActivity`] values from decoded message streams
#[derive(Debug, Clone)]
pub struct TelemetryExtractor {
    running_dynamics_ratio: f64,
}

impl TelemetryExtractor {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            running_dynamics_ratio: config.running_dynamics_ratio,
        }
    }

    /// Decode a file with `decoder` and extract it
    pub fn extract_file(
        &self,
        decoder: &dyn MessageDecoder,
        path: &Path,
    ) -> Result<ExtractedActivity, TelemetryError> {
        let messages = decoder.decode_file(path)?;
        debug!(
            path = %path.display(),
            decoder = decoder.decoder_name(),
            "Extracting telemetry"
        );
        Ok(self.extract(messages))
    }

    /// Extract summary, samples and laps from a message stream
    pub fn extract<I>(&self, messages: I) -> ExtractedActivity
    where
        I: IntoIterator<Item = FitMessage>,
    {
        let mut session: Option<SessionMessage> = None;
        let mut samples = Vec::new();
        let mut laps = Vec::new();
        let mut reference: Option<NaiveDateTime> = None;

        for message in messages {
            match message {
                FitMessage::Session(s) => {
                    if session.is_none() {
                        session = Some(s);
                    }
                }
                FitMessage::Record(record) => {
                    if let Some(sample) = normalize_record(&record, &mut reference) {
                        samples.push(sample);
                    }
                }
                FitMessage::Lap(lap) => {
                    let lap_number = laps.len() as u32 + 1;
                    laps.push(normalize_lap(lap_number, &lap));
                }
                FitMessage::Other => {}
            }
        }

        let summary = match session {
            Some(s) => summarize_session(&s),
            None => {
                warn!("Telemetry stream has no session message, using empty summary");
                summarize_session(&SessionMessage::default())
            }
        };

        let has_running_dynamics = self.detect_running_dynamics(&samples);

        debug!(
            samples = samples.len(),
            laps = laps.len(),
            has_running_dynamics,
            "Telemetry extracted"
        );

        ExtractedActivity {
            summary,
            samples,
            laps,
            has_running_dynamics,
        }
    }

    /// Accessory-equipped runs report GCT balance on nearly every sample,
    /// watches on their own only sporadically or never
    fn detect_running_dynamics(&self, samples: &[Sample]) -> bool {
        let with_balance = samples
            .iter()
            .filter(|s| s.gct_balance_pct.is_some())
            .count();
        with_balance as f64 > samples.len() as f64 * self.running_dynamics_ratio
    }
}

impl Default for TelemetryExtractor {
    fn default() -> Self {
        Self::new(&TelemetryConfig::default())
    }
}

fn summarize_session(session: &SessionMessage) -> ActivitySummary {
    let total_distance_m = session.total_distance.unwrap_or(0.0);
    let total_duration_sec = session.total_elapsed_time.unwrap_or(0.0);

    ActivitySummary {
        start_time_iso: session
            .start_time
            .map(|t| t.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        total_distance_m,
        total_duration_sec,
        avg_pace_sec_per_km: derive_pace(total_distance_m, total_duration_sec),
        avg_heart_rate: session.avg_heart_rate,
        activity_name: session
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_ACTIVITY_NAME.to_string()),
        activity_type: session
            .sport
            .clone()
            .unwrap_or_else(|| DEFAULT_ACTIVITY_TYPE.to_string()),
    }
}

/// Convert one record; `None` when it carries no timestamp
fn normalize_record(record: &RecordMessage, reference: &mut Option<NaiveDateTime>) -> Option<Sample> {
    let timestamp = record.timestamp?;
    let start = *reference.get_or_insert(timestamp);
    let offset = (timestamp - start).num_milliseconds() as f64 / 1000.0;

    // enhanced_speed takes precedence over speed
    let pace_sec_per_km = [record.enhanced_speed, record.speed]
        .into_iter()
        .flatten()
        .find(|speed| *speed > 0.0)
        .map(|speed| METERS_PER_KM / speed);

    Some(Sample {
        timestamp_offset_sec: offset,
        heart_rate: record.heart_rate,
        cadence: record.cadence.map(normalize_cadence),
        pace_sec_per_km,
        ground_contact_ms: record.stance_time,
        gct_balance_pct: record.stance_time_balance,
        vertical_ratio_pct: record.vertical_ratio,
        vertical_oscillation_mm: record.vertical_oscillation,
        stride_length_m: record.step_length.map(|cm| cm / CENTIMETERS_PER_METER),
        power: record.power,
    })
}

fn normalize_lap(lap_number: u32, lap: &LapMessage) -> Lap {
    let distance_m = lap.total_distance.unwrap_or(0.0);
    let duration_sec = lap.total_elapsed_time.unwrap_or(0.0);

    let avg_cadence = lap
        .avg_running_cadence
        .filter(|c| *c > 0.0)
        .or(lap.avg_cadence)
        .map(|c| if c > 0.0 { normalize_cadence(c) } else { c });

    Lap {
        lap_number,
        distance_m,
        duration_sec,
        avg_pace_sec_per_km: derive_pace(distance_m, duration_sec),
        avg_heart_rate: lap.avg_heart_rate,
        avg_cadence,
        avg_ground_contact_ms: lap.avg_stance_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 8)
            .unwrap()
            .and_hms_opt(7, 15, second)
            .unwrap()
    }

    fn record(second: u32) -> RecordMessage {
        RecordMessage {
            timestamp: Some(at(second)),
            ..Default::default()
        }
    }

    #[test]
    fn test_cadence_doubling_boundary() {
        assert_eq!(normalize_cadence(90.0), 180.0);
        assert_eq!(normalize_cadence(119.0), 238.0);
        assert_eq!(normalize_cadence(120.0), 120.0);
        assert_eq!(normalize_cadence(170.0), 170.0);
    }

    #[test]
    fn test_derive_pace() {
        assert_eq!(derive_pace(5000.0, 1500.0), 300.0);
        assert_eq!(derive_pace(0.0, 1500.0), 0.0);
        assert_eq!(derive_pace(1000.0, 0.0), 0.0);
    }

    #[test]
    fn test_offsets_are_relative_to_first_record() {
        let extractor = TelemetryExtractor::default();
        let extracted = extractor.extract(vec![
            FitMessage::Record(record(10)),
            FitMessage::Record(record(11)),
            FitMessage::Record(record(13)),
        ]);

        let offsets: Vec<f64> = extracted
            .samples
            .iter()
            .map(|s| s.timestamp_offset_sec)
            .collect();
        assert_eq!(offsets, vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_record_without_timestamp_is_dropped() {
        let extractor = TelemetryExtractor::default();
        let extracted = extractor.extract(vec![
            FitMessage::Record(RecordMessage {
                heart_rate: Some(150),
                ..Default::default()
            }),
            FitMessage::Record(record(0)),
        ]);

        assert_eq!(extracted.samples.len(), 1);
        assert_eq!(extracted.samples[0].heart_rate, None);
    }

    #[test]
    fn test_record_field_conversions() {
        let sample = normalize_record(
            &RecordMessage {
                timestamp: Some(at(0)),
                cadence: Some(88.0),
                speed: Some(3.0),
                enhanced_speed: Some(4.0),
                step_length: Some(125.0),
                stance_time: Some(241.5),
                ..Default::default()
            },
            &mut None,
        )
        .unwrap();

        assert_eq!(sample.cadence, Some(176.0));
        assert_eq!(sample.pace_sec_per_km, Some(250.0));
        assert_eq!(sample.stride_length_m, Some(1.25));
        assert_eq!(sample.ground_contact_ms, Some(241.5));
        assert_eq!(sample.gct_balance_pct, None);
    }

    #[test]
    fn test_zero_speed_yields_no_pace() {
        let sample = normalize_record(
            &RecordMessage {
                timestamp: Some(at(0)),
                speed: Some(0.0),
                ..Default::default()
            },
            &mut None,
        )
        .unwrap();
        assert_eq!(sample.pace_sec_per_km, None);
    }

    #[test]
    fn test_only_first_session_is_used() {
        let extractor = TelemetryExtractor::default();
        let extracted = extractor.extract(vec![
            FitMessage::Session(SessionMessage {
                start_time: Some(at(0)),
                total_distance: Some(5000.0),
                total_elapsed_time: Some(1500.0),
                ..Default::default()
            }),
            FitMessage::Session(SessionMessage {
                total_distance: Some(1.0),
                ..Default::default()
            }),
        ]);

        let summary = extracted.summary;
        assert_eq!(summary.total_distance_m, 5000.0);
        assert_eq!(summary.avg_pace_sec_per_km, 300.0);
        assert_eq!(summary.start_time_iso.as_deref(), Some("2026-01-08T07:15:00Z"));
        assert_eq!(summary.activity_name, "Run");
        assert_eq!(summary.activity_type, "running");
    }

    #[test]
    fn test_laps_numbered_and_cadence_normalized() {
        let extractor = TelemetryExtractor::default();
        let extracted = extractor.extract(vec![
            FitMessage::Lap(LapMessage {
                total_distance: Some(1000.0),
                total_elapsed_time: Some(300.0),
                avg_running_cadence: Some(86.0),
                ..Default::default()
            }),
            FitMessage::Lap(LapMessage {
                total_distance: Some(0.0),
                total_elapsed_time: Some(60.0),
                avg_running_cadence: Some(0.0),
                avg_cadence: Some(172.0),
                ..Default::default()
            }),
        ]);

        assert_eq!(extracted.laps[0].lap_number, 1);
        assert_eq!(extracted.laps[0].avg_cadence, Some(172.0));
        assert_eq!(extracted.laps[0].avg_pace_sec_per_km, 300.0);
        assert_eq!(extracted.laps[1].lap_number, 2);
        assert_eq!(extracted.laps[1].avg_cadence, Some(172.0));
        assert_eq!(extracted.laps[1].avg_pace_sec_per_km, 0.0);
    }

    #[test]
    fn test_running_dynamics_requires_majority() {
        let extractor = TelemetryExtractor::default();
        let with_balance = |second| {
            FitMessage::Record(RecordMessage {
                stance_time_balance: Some(49.8),
                ..record(second)
            })
        };

        let half = extractor.extract(vec![with_balance(0), FitMessage::Record(record(1))]);
        assert!(!half.has_running_dynamics);

        let majority = extractor.extract(vec![
            with_balance(0),
            with_balance(1),
            FitMessage::Record(record(2)),
        ]);
        assert!(majority.has_running_dynamics);

        let empty = extractor.extract(Vec::new());
        assert!(!empty.has_running_dynamics);
    }
}
