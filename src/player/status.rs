/// Format the right-hand status line: `[VOL%][MM:SS/MM:SS]`.
///
/// Negative positions or durations are shown as zero.
pub fn format_status(volume: i64, position: f64, duration: f64) -> String {
    let (position_min, position_sec) = minutes_and_seconds(position);
    let (duration_min, duration_sec) = minutes_and_seconds(duration);

    format!(
        "[{}%][{:02}:{:02}/{:02}:{:02}]",
        volume, position_min, position_sec, duration_min, duration_sec
    )
}

fn minutes_and_seconds(seconds: f64) -> (u64, u64) {
    // `max` also maps NaN to zero; `as` saturates on overflow.
    let whole = seconds.max(0.0) as u64;
    (whole / 60, whole % 60)
}
