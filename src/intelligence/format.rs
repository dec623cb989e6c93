// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Display helpers for paces and workout step types

/// Format seconds per kilometer as `M:SS`
///
/// Non-positive paces have no meaningful rendering and come out as `--:--`.
pub fn format_pace(sec_per_km: f64) -> String {
    if !sec_per_km.is_finite() || sec_per_km <= 0.0 {
        return "--:--".to_string();
    }
    let minutes = (sec_per_km / 60.0).floor() as u64;
    let seconds = (sec_per_km % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, seconds)
}

/// Parse an `M:SS` pace back into seconds per kilometer
pub fn parse_pace(text: &str) -> Option<f64> {
    let (minutes, seconds) = text.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    let total = minutes.checked_mul(60)?.checked_add(seconds)?;
    Some(f64::from(total))
}

/// Display name for a device step type
pub fn format_step_type(step_type: &str) -> String {
    let known = match step_type.to_lowercase().as_str() {
        "warmup" | "warm_up" => Some("Warmup"),
        "cooldown" | "cool_down" => Some("Cooldown"),
        "active" => Some("Active"),
        // Garmin tags work intervals as "other"
        "interval" | "other" => Some("Interval"),
        "recovery" | "rest" => Some("Recovery"),
        "run" => Some("Run"),
        "work" => Some("Work"),
        _ => None,
    };

    match known {
        Some(name) => name.to_string(),
        None => title_case(&step_type.replace('_', " ")),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
