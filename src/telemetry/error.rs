// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::path::PathBuf;

/// Errors raised while reading decoded telemetry
///
/// None of these are transient: a corrupt stream stays corrupt, so callers should
/// surface them instead of retrying.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Telemetry file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to parse telemetry at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Failed to read telemetry: {0}")]
    Io(#[from] std::io::Error),
}
