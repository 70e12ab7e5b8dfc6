/// Token that starts a new speaker turn in the flat transcript
pub const TURN_MARKER: &str = " -";

/// Put every speaker turn on its own line.
///
/// Each ` -` becomes a line break followed by `-`; trailing whitespace is
/// dropped.
pub fn format_speaker_turns(transcript: &str) -> String {
    let formatted = transcript.replace(TURN_MARKER, "\n-");
    formatted.trim_end().to_string()
}
