use std::time::Duration;

/// Separator between the start and end of a cue timing line
pub const CUE_ARROW: &str = "-->";

/// Parse a cue timestamp (`HH:MM:SS.mmm`, `HH:MM:SS,mmm`, or `MM:SS.mmm`)
pub fn parse_timestamp(timestamp: &str) -> Option<Duration> {
    let timestamp = timestamp.trim();
    let (clock, millis) = match timestamp.split_once(['.', ',']) {
        Some((clock, millis)) => (clock, millis),
        None => (timestamp, "0"),
    };

    if millis.is_empty() || millis.len() > 3 || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (parse_field(h)?, parse_field(m)?, parse_field(s)?),
        [m, s] => (0, parse_field(m)?, parse_field(s)?),
        _ => return None,
    };

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    // "5" after the separator is 500ms, not 5ms
    let millis: u64 = format!("{:0<3}", millis).parse().ok()?;
    let total_millis = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)?
        .checked_mul(1000)?
        .checked_add(millis)?;

    Some(Duration::from_millis(total_millis))
}

/// Start time of a cue timing line such as `00:34:00.000 --> 00:34:02.000 align:start`
pub fn cue_start(line: &str) -> Option<Duration> {
    let (start, _) = line.split_once(CUE_ARROW)?;
    parse_timestamp(start)
}

/// Format a duration the way WebVTT writes it (HH:MM:SS.mmm)
pub fn format_timestamp(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let milliseconds = duration.subsec_millis();

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
}

fn parse_field(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
