use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::captions::{format_speaker_turns, CaptionWindowExtractor};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::fetcher::CaptionFetcher;
use crate::llm::{create_client, LLMProvider, ModelClient};
use crate::locator::EpisodeLocator;
use crate::output::{ResultWriter, Stage};
use crate::prompt::PromptComposer;

pub const TRANSCRIPT_FILE: &str = "transcript.txt";
pub const TURNS_FILE: &str = "transcript_turns.txt";
pub const PROMPT_FILE: &str = "prompt.txt";
pub const RESPONSE_FILE: &str = "response.txt";
pub const RESPONSE_META_FILE: &str = "response.json";

/// Per-run switches coming from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Re-download captions and re-parse even if artifacts exist
    pub force: bool,
    /// Stop after writing the transcript
    pub transcript_only: bool,
}

/// What a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub episode_url: String,
    pub output_dir: PathBuf,
    pub caption_path: PathBuf,
    pub transcript_path: PathBuf,
    pub prompt_path: Option<PathBuf>,
    pub response_path: Option<PathBuf>,
    pub transcript_chars: usize,
    pub tokens_used: Option<u32>,
    pub processing_time: Duration,
}

/// Metadata stored next to the model response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub episode_url: String,
    pub provider: LLMProvider,
    pub model: String,
    pub tokens_used: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Runs locate → fetch → parse → prompt → model → write, stopping at the
/// first failing stage
pub struct Pipeline {
    config: Config,
    extractor: CaptionWindowExtractor,
    composer: PromptComposer,
    model_client: Option<Box<dyn ModelClient>>,
}

impl Pipeline {
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let extractor = CaptionWindowExtractor::from_config(&config.captions)?;
        let composer = PromptComposer::from_config(&config.prompt).await?;

        info!("🔧 Pipeline ready (trigger: {})", extractor.policy_name());

        Ok(Self {
            config,
            extractor,
            composer,
            model_client: None,
        })
    }

    /// Use this client instead of building one from the LLM config
    pub fn with_model_client(mut self, client: Box<dyn ModelClient>) -> Self {
        self.model_client = Some(client);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Episode to process: the given URL, or the latest one on the listing page
    pub async fn resolve_episode(&self, url: Option<&str>) -> Result<String> {
        if let Some(url) = url {
            return Ok(url.to_string());
        }

        let listing_url = self
            .config
            .locator
            .listing_url
            .as_deref()
            .ok_or(PipelineError::MissingInput)?;

        let locator = EpisodeLocator::new(&self.config.locator)?;
        let episode = locator.latest_episode(listing_url).await?;
        Ok(episode.to_string())
    }

    pub async fn run(&self, url: Option<&str>, options: RunOptions) -> Result<RunReport> {
        let start_time = Instant::now();

        let episode_url = self.resolve_episode(url).await?;
        let writer = ResultWriter::new(&self.config.output.base_dir, &episode_url);

        info!("🚀 Processing {}", episode_url);
        info!("📂 Output: {}", writer.root().display());

        // Stage 1: captions
        let captions_dir = writer.ensure_stage(Stage::Captions).await?;
        let captions = CaptionFetcher::new(self.config.fetcher.clone())
            .force(options.force)
            .fetch(&episode_url, &captions_dir)
            .await?;

        // Stage 2: transcript
        let transcript_path = writer.artifact_path(Stage::Transcript, TRANSCRIPT_FILE);
        let cached = if self.config.output.reuse_transcript && !options.force && !captions.downloaded {
            writer.read_existing(Stage::Transcript, TRANSCRIPT_FILE).await?
        } else {
            None
        };

        let transcript = match cached {
            Some(transcript) => {
                info!("📁 Reusing transcript: {}", transcript_path.display());
                transcript
            }
            None => {
                let transcript = self.extractor.extract_file(&captions.path).await?;
                writer
                    .write_text(Stage::Transcript, TRANSCRIPT_FILE, &transcript)
                    .await?;
                if self.config.captions.format_speaker_turns {
                    writer
                        .write_text(Stage::Transcript, TURNS_FILE, &format_speaker_turns(&transcript))
                        .await?;
                }
                transcript
            }
        };

        if transcript.trim().is_empty() {
            warn!("Transcript is empty; check the trigger settings for this episode");
        }

        let mut report = RunReport {
            episode_url: episode_url.clone(),
            output_dir: writer.root().to_path_buf(),
            caption_path: captions.path,
            transcript_path,
            prompt_path: None,
            response_path: None,
            transcript_chars: transcript.chars().count(),
            tokens_used: None,
            processing_time: Duration::ZERO,
        };

        if options.transcript_only {
            report.processing_time = start_time.elapsed();
            info!("🎉 Transcript written in {:.2}s", report.processing_time.as_secs_f64());
            return Ok(report);
        }

        // Stage 3: prompt
        let prompt = self.composer.compose(&transcript);
        report.prompt_path = Some(writer.write_text(Stage::Prompt, PROMPT_FILE, &prompt).await?);

        // Stage 4: model response
        let built_client;
        let client: &dyn ModelClient = match &self.model_client {
            Some(client) => client.as_ref(),
            None => {
                built_client = create_client(&self.config.llm)
                    .map_err(|e| PipelineError::Model(format!("{:#}", e)))?;
                built_client.as_ref()
            }
        };

        info!("🤖 Asking {:?} model {}", client.provider_type(), self.config.llm.model);
        let completion = client
            .complete(&prompt)
            .await
            .map_err(|e| PipelineError::Model(format!("{:#}", e)))?;

        report.response_path = Some(
            writer
                .write_text(Stage::Response, RESPONSE_FILE, &completion.content)
                .await?,
        );
        writer
            .write_json(
                Stage::Response,
                RESPONSE_META_FILE,
                &ResponseRecord {
                    episode_url,
                    provider: client.provider_type(),
                    model: completion.model.clone(),
                    tokens_used: completion.tokens_used,
                    created_at: Utc::now(),
                },
            )
            .await?;

        report.tokens_used = completion.tokens_used;
        report.processing_time = start_time.elapsed();

        info!("🎉 Completed in {:.2}s", report.processing_time.as_secs_f64());
        if let Some(tokens) = report.tokens_used {
            info!("📊 Tokens used: {}", tokens);
        }

        Ok(report)
    }
}
