// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sources of decoded telemetry messages

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::{FitMessage, TelemetryError};

/// Turns a stored activity into a sequence of typed messages
///
/// Implementations wrap whatever decoder produced the messages. They must be
/// shareable across threads so independent activities can be decoded in parallel.
pub trait MessageDecoder: Send + Sync {
    /// Decode every message from a buffered reader
    fn decode_reader(&self, reader: &mut dyn BufRead) -> Result<Vec<FitMessage>, TelemetryError>;

    /// Decode a file, reporting a missing file as [`TelemetryError::NotFound`]
    fn decode_file(&self, path: &Path) -> Result<Vec<FitMessage>, TelemetryError> {
        if !path.exists() {
            return Err(TelemetryError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let mut reader = BufReader::new(File::open(path)?);
        self.decode_reader(&mut reader)
    }

    fn decoder_name(&self) -> &'static str;
}

/// Reads newline-delimited JSON, one message per line, tagged by `kind`
///
/// ```text
/// {"kind":"session","start_time":"2026-01-08T07:15:00","total_distance":5050.0,"total_elapsed_time":1500.0}
/// {"kind":"record","timestamp":"2026-01-08T07:15:00","heart_rate":142,"cadence":88}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesDecoder;

impl MessageDecoder for JsonLinesDecoder {
    fn decode_reader(&self, reader: &mut dyn BufRead) -> Result<Vec<FitMessage>, TelemetryError> {
        let mut messages = Vec::new();

        // Raw bytes per line, so invalid UTF-8 is reported as a parse error on that line
        for (index, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            let message = serde_json::from_slice::<FitMessage>(trimmed).map_err(|e| {
                TelemetryError::Parse {
                    line: index + 1,
                    message: e.to_string(),
                }
            })?;
            messages.push(message);
        }

        debug!(messages = messages.len(), "Decoded telemetry message stream");
        Ok(messages)
    }

    fn decoder_name(&self) -> &'static str {
        "json-lines"
    }
}
