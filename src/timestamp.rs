//! Timestamp parsing and formatting
//!
//! Backend payloads carry segment boundaries as `HH:MM:SS` or `MM:SS` text,
//! sometimes alongside pre-computed seconds and sometimes not. Everything in
//! here is total on string input.

use regex::Regex;
use std::sync::OnceLock;

/// Parse `HH:MM:SS` or `MM:SS` into whole seconds.
///
/// Returns `None` for anything else, including empty input, non-digit
/// components, too many components or values that overflow `u32`.
pub fn parse_timestamp(text: &str) -> Option<u32> {
    let parts: Vec<&str> = text.trim().split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (parse_component(h)?, parse_component(m)?, parse_component(s)?),
        [m, s] => (0, parse_component(m)?, parse_component(s)?),
        _ => return None,
    };

    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

fn parse_component(part: &str) -> Option<u32> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Registry fallback: malformed text becomes 0
pub fn seconds_or_zero(text: &str) -> u32 {
    parse_timestamp(text).unwrap_or(0)
}

/// Link fallback: malformed text becomes -1 so callers can skip the marker
pub fn seconds_or_sentinel(text: &str) -> i64 {
    parse_timestamp(text).map(i64::from).unwrap_or(-1)
}

/// Format seconds as canonical `HH:MM:SS`
pub fn format_timestamp(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Format a fractional media position, truncating to whole seconds
pub fn format_position(position: f64) -> String {
    if !position.is_finite() || position < 0.0 {
        return format_timestamp(0);
    }
    format_timestamp(position.min(u32::MAX as f64) as u32)
}

/// An inline `[HH:MM:SS]` or `[HH:MM:SS-HH:MM:SS]` marker found in summary text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRef {
    /// Byte range of the whole bracketed marker
    pub span: std::ops::Range<usize>,
    /// Marker text including brackets
    pub text: String,
    pub start_seconds: u32,
    pub end_seconds: Option<u32>,
}

fn timestamp_ref_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\[(\d{2}:\d{2}:\d{2})(?:-(\d{2}:\d{2}:\d{2}))?\]").ok())
        .as_ref()
}

/// Find every timestamp marker in `text`, in order of appearance
pub fn find_timestamp_refs(text: &str) -> Vec<TimestampRef> {
    let Some(pattern) = timestamp_ref_pattern() else {
        return Vec::new();
    };

    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let start = seconds_or_sentinel(caps.get(1)?.as_str());
            if start < 0 {
                return None;
            }
            Some(TimestampRef {
                span: whole.range(),
                text: whole.as_str().to_string(),
                start_seconds: start as u32,
                end_seconds: caps.get(2).and_then(|m| parse_timestamp(m.as_str())),
            })
        })
        .collect()
}
