/// Caption window extraction
///
/// Walks a WebVTT caption file line by line, opens the final-round window
/// according to a pluggable trigger policy, and joins the cleaned spoken
/// text of every later content line into one flat transcript.

pub mod format;
pub mod markup;
pub mod scanner;
pub mod timing;
pub mod trigger;

pub use format::format_speaker_turns;
pub use markup::MarkupStripper;
pub use scanner::{extract_transcript, CaptionScanner, NextLine, ScanState};
pub use trigger::{
    FixedTimestamp, MarkerAfterThreshold, MultiTimestamp, Trigger, TriggerConfig, TriggerPolicy,
};

use crate::config::CaptionsConfig;
use crate::error::{PipelineError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Trigger policy plus cleanup rule, ready to scan any number of files
pub struct CaptionWindowExtractor {
    policy: Box<dyn TriggerPolicy + Send + Sync>,
    stripper: MarkupStripper,
}

impl CaptionWindowExtractor {
    pub fn new(policy: Box<dyn TriggerPolicy + Send + Sync>, stripper: MarkupStripper) -> Self {
        Self { policy, stripper }
    }

    pub fn from_config(config: &CaptionsConfig) -> Result<Self> {
        let policy = config.trigger.build().map_err(PipelineError::Config)?;
        let stripper = config.stripper()?;
        Ok(Self::new(policy, stripper))
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Cleaned in-window lines, lazily
    pub fn lines<'a>(&'a self, content: &'a str) -> CaptionScanner<'a, &'a (dyn TriggerPolicy + Send + Sync)> {
        CaptionScanner::new(content, self.policy.as_ref(), &self.stripper)
    }

    /// Flat transcript: every in-window line followed by one space
    pub fn extract(&self, content: &str) -> String {
        extract_transcript(content, self.policy.as_ref(), &self.stripper)
    }

    /// Read a caption file and extract its transcript
    pub async fn extract_file(&self, path: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        debug!("Read {} caption lines from {}", content.lines().count(), path.display());

        let transcript = self.extract(&content);
        if transcript.is_empty() {
            info!("⚠️ No final-round window found with the {} trigger", self.policy_name());
        } else {
            info!(
                "📜 Extracted {} chars of transcript with the {} trigger",
                transcript.len(),
                self.policy_name()
            );
        }
        Ok(transcript)
    }
}
