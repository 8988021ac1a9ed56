//! Timestamp rendering for segment boundaries

/// Render seconds as `HH:MM:SS.mmm`
///
/// Milliseconds are rounded to nearest. Hours widen past two digits for very
/// long inputs. Negative and non-finite values render as zero.
pub fn format_timestamp(secs: f64) -> String {
    let total_ms = if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    };

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
