use crate::config::PromptConfig;
use crate::error::{PipelineError, Result};
use tracing::{debug, info};

pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

/// Delimiter wrapped around the transcript inside the prompt
pub const QUOTE_DELIMITER: &str = "\"\"\"";

const DEFAULT_TEMPLATE: &str = r#"The text below is the caption transcript of the final round of a French television quiz show. The presenter announces a theme, then reads questions one after another; a candidate answers each one. Lines starting with "-" are new speaker turns.

Extract every question asked during this final round. For each one give the theme, the question as the presenter asked it, and the expected answer. If an answer is not given in the transcript, use null. Keep the original French wording.

Reply with a JSON array only, no commentary, using this shape:
[{"theme": "...", "question": "...", "answer": "..."}]

Transcript:
{transcript}"#;

/// Builds the extraction prompt around a transcript
#[derive(Debug, Clone)]
pub struct PromptComposer {
    template: String,
}

impl PromptComposer {
    /// Composer with a custom template; the template must contain `{transcript}`
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(TRANSCRIPT_PLACEHOLDER) {
            return Err(PipelineError::Config(format!(
                "prompt template has no {} placeholder",
                TRANSCRIPT_PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    /// Load the template file named in the config, or use the built-in one
    pub async fn from_config(config: &PromptConfig) -> Result<Self> {
        match &config.prompt_file {
            Some(path) => {
                let template = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| PipelineError::io(path, e))?;
                info!("📝 Loaded prompt template from {}", path.display());
                Self::new(template.trim())
            }
            None => Ok(Self::default()),
        }
    }

    /// Embed the transcript verbatim between `"""` delimiters
    pub fn compose(&self, transcript: &str) -> String {
        let quoted = format!("{}\n{}\n{}", QUOTE_DELIMITER, transcript, QUOTE_DELIMITER);
        let prompt = self.template.replace(TRANSCRIPT_PLACEHOLDER, &quoted);
        debug!("Composed prompt ({} chars)", prompt.len());
        prompt
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
