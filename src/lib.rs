/// Quiz Extractor
///
/// Pulls the final-round questions out of a televised quiz show: downloads the
/// episode's captions, cuts the final-round window out of them, and asks a
/// chat model to turn the transcript into structured questions.

pub mod captions;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod llm;
pub mod locator;
pub mod output;
pub mod pipeline;
pub mod prompt;

// Re-export main types for easy access
pub use crate::captions::{CaptionWindowExtractor, MarkupStripper, TriggerConfig, TriggerPolicy};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{PipelineError, Result};
pub use crate::fetcher::CaptionFetcher;
pub use crate::llm::{create_client, Completion, LLMConfig, LLMProvider, ModelClient};
pub use crate::locator::EpisodeLocator;
pub use crate::output::{ResultWriter, Stage};
pub use crate::pipeline::{Pipeline, RunOptions, RunReport};
pub use crate::prompt::PromptComposer;
