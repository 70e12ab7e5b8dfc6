use super::markup::MarkupStripper;
use super::timing::CUE_ARROW;
use super::trigger::{Trigger, TriggerPolicy};
use std::iter::Peekable;
use std::str::Lines;

/// Mutable state threaded through one scan. Both flags only ever go from
/// `false` to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub past_threshold: bool,
    pub window_open: bool,
}

/// One line of lookahead, or the end of the caption file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextLine<'a> {
    Line(&'a str),
    End,
}

impl NextLine<'_> {
    /// A missing next line does not count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            NextLine::Line(line) => line.trim().is_empty(),
            NextLine::End => false,
        }
    }
}

/// Whether a raw line can carry spoken text: not blank, not a cue timing
/// line, not a bare cue index.
pub fn is_content_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.contains(CUE_ARROW) && !is_cue_index(trimmed)
}

fn is_cue_index(trimmed: &str) -> bool {
    !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
}

/// Lazy scan over a caption file, yielding the cleaned text of every
/// in-window content line in file order.
pub struct CaptionScanner<'a, P> {
    lines: Peekable<Lines<'a>>,
    policy: P,
    stripper: &'a MarkupStripper,
    state: ScanState,
}

impl<'a, P: TriggerPolicy> CaptionScanner<'a, P> {
    pub fn new(content: &'a str, policy: P, stripper: &'a MarkupStripper) -> Self {
        Self {
            lines: content.lines().peekable(),
            policy,
            stripper,
            state: ScanState::default(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    fn peek(&mut self) -> NextLine<'a> {
        match self.lines.peek() {
            Some(&line) => NextLine::Line(line),
            None => NextLine::End,
        }
    }

    /// Decide whether `line` falls inside the window, advancing the state
    fn in_window(&mut self, line: &str) -> bool {
        if self.state.window_open {
            return true;
        }

        let next = self.peek();
        match self.policy.check(line, next, &mut self.state) {
            Trigger::Pending => false,
            Trigger::OpensHere => {
                self.state.window_open = true;
                true
            }
            Trigger::OpensAfter => {
                self.state.window_open = true;
                false
            }
        }
    }
}

impl<P: TriggerPolicy> Iterator for CaptionScanner<'_, P> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(line) = self.lines.next() {
            if !self.in_window(line) || !is_content_line(line) {
                continue;
            }

            let cleaned = self.stripper.clean(line);
            if !cleaned.is_empty() {
                return Some(cleaned);
            }
        }
        None
    }
}

/// Run a full scan and join the cleaned lines, each followed by one space
pub fn extract_transcript<P: TriggerPolicy>(
    content: &str,
    policy: P,
    stripper: &MarkupStripper,
) -> String {
    CaptionScanner::new(content, policy, stripper).fold(String::new(), |mut transcript, line| {
        transcript.push_str(&line);
        transcript.push(' ');
        transcript
    })
}
