//! Time column normalization
//!
//! SPM exports deliver time as millisecond epoch stamps, relative seconds,
//! wall-clock `HH:MM:SS` strings or `T+<n>s` offsets depending on the
//! recorder. Everything is brought to seconds from the start of the run.

use crate::config::defaults::{MS_PER_SECOND, SECONDS_PER_DAY};
use crate::types::{RawValue, TimeBase};
use chrono::NaiveTime;

/// Normalize a raw time column to seconds.
///
/// When the magnitude of the first value exceeds `epoch_threshold`, the whole
/// column is read as millisecond epoch stamps and rebased to whole seconds
/// from the first stamp, rounding half up. Otherwise numeric values pass
/// through as relative seconds and text cells are read as clock or offset
/// times. Cells that cannot be read are `None`.
pub fn normalize_times(cells: &[RawValue], epoch_threshold: f64) -> (Vec<Option<f64>>, TimeBase) {
    let first = cells.first().and_then(RawValue::as_number);

    if let Some(t0) = first.filter(|t| t.abs() > epoch_threshold) {
        let seconds = cells
            .iter()
            .map(|cell| cell.as_number().map(|t| round_half_up((t - t0) / MS_PER_SECOND)))
            .collect();
        return (seconds, TimeBase::EpochMillis);
    }

    let mut clock_base: Option<NaiveTime> = None;
    let seconds = cells
        .iter()
        .map(|cell| {
            cell.as_number()
                .or_else(|| cell.as_text().and_then(|text| parse_text_time(text, &mut clock_base)))
        })
        .collect();
    (seconds, TimeBase::RelativeSeconds)
}

/// `Math.round` semantics: halves go towards +∞.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn parse_text_time(text: &str, clock_base: &mut Option<NaiveTime>) -> Option<f64> {
    let text = text.trim();

    if let Some(offset) = text.strip_prefix("T+") {
        let offset = offset.strip_suffix('s').unwrap_or(offset);
        return offset.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    }

    let clock = NaiveTime::parse_from_str(text, "%H:%M:%S").ok()?;
    let base = *clock_base.get_or_insert(clock);
    let mut delta = (clock - base).num_seconds();
    // Clock went past midnight
    if delta < 0 {
        delta += SECONDS_PER_DAY;
    }
    Some(delta as f64)
}
