use crate::captions::markup::{MarkupStripper, DEFAULT_BOILERPLATE, DEFAULT_COLOR_TAGS};
use crate::captions::trigger::TriggerConfig;
use crate::error::{PipelineError, Result};
use crate::llm::{LLMConfig, LLMProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the quiz extractor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Latest-episode discovery
    pub locator: LocatorConfig,

    /// Caption download settings
    pub fetcher: FetcherConfig,

    /// Caption window and cleanup rules
    pub captions: CaptionsConfig,

    /// Model provider settings
    pub llm: LLMConfig,

    /// Prompt template settings
    pub prompt: PromptConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Listing page holding a link to the latest episode
    pub listing_url: Option<String>,

    /// CSS selector of the latest-episode link
    pub link_selector: String,

    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,

    /// User agent sent with the listing request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Downloader executable
    pub command: String,

    /// Caption language to request
    pub subtitle_lang: String,

    /// File stem of the downloaded captions
    pub file_stem: String,

    /// Extra arguments passed before the URL
    pub extra_args: Vec<String>,

    /// Skip the download when the caption file already exists
    pub skip_existing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionsConfig {
    /// Rule that opens the final-round window
    pub trigger: TriggerConfig,

    /// Colors whose `<c.color>` tags are stripped
    pub color_tags: Vec<String>,

    /// Broadcaster fragments removed from every line
    pub boilerplate: Vec<String>,

    /// Also write a transcript with one speaker turn per line
    pub format_speaker_turns: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Template file containing a `{transcript}` placeholder
    pub prompt_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the stage-numbered output folders
    pub base_dir: PathBuf,

    /// Default log filter
    pub log_level: String,

    /// Reuse a transcript already on disk instead of re-parsing
    pub reuse_transcript: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            listing_url: None,
            link_selector: "a.c-card-video__link".to_string(),
            timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            command: "yt-dlp".to_string(),
            subtitle_lang: "fr".to_string(),
            file_stem: "captions".to_string(),
            extra_args: Vec::new(),
            skip_existing: true,
        }
    }
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::default(),
            color_tags: DEFAULT_COLOR_TAGS.iter().map(|c| c.to_string()).collect(),
            boilerplate: DEFAULT_BOILERPLATE.iter().map(|b| b.to_string()).collect(),
            format_speaker_turns: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./output"),
            log_level: "info".to_string(),
            reuse_transcript: true,
        }
    }
}

impl CaptionsConfig {
    /// Compile the markup stripper for these settings
    pub fn stripper(&self) -> Result<MarkupStripper> {
        MarkupStripper::new(&self.color_tags, &self.boilerplate)
            .map_err(|e| PipelineError::Config(format!("invalid markup pattern: {}", e)))
    }
}

impl Config {
    const SEARCH_PATHS: [&'static str; 2] = ["quiz-extractor.toml", "config/quiz-extractor.toml"];

    /// Load configuration from `path`, or from the first default location
    /// that exists, or fall back to defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let found = Self::SEARCH_PATHS
                    .iter()
                    .map(Path::new)
                    .find(|candidate| candidate.exists());
                match found {
                    Some(candidate) => Self::from_file(candidate)?,
                    None => {
                        tracing::debug!("No configuration file found, using defaults");
                        Self::default()
                    }
                }
            }
        };

        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str =
            std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config = toml::from_str(&config_str).map_err(|e| {
            PipelineError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from any `QUIZ_EXTRACTOR_*` style lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(output_dir) = lookup("QUIZ_EXTRACTOR_OUTPUT_DIR") {
            self.output.base_dir = PathBuf::from(output_dir);
        }

        if let Some(api_key) = lookup("QUIZ_EXTRACTOR_API_KEY") {
            self.llm.api_key = Some(api_key);
        } else if self.llm.api_key.is_none() {
            self.llm.api_key = match self.llm.provider {
                LLMProvider::OpenAI => lookup("OPENAI_API_KEY"),
                LLMProvider::Gemini => lookup("GEMINI_API_KEY"),
                LLMProvider::LMStudio => None,
            };
        }

        if let Some(model) = lookup("QUIZ_EXTRACTOR_MODEL") {
            self.llm.model = model;
        }

        if let Some(listing_url) = lookup("QUIZ_EXTRACTOR_LISTING_URL") {
            self.locator.listing_url = Some(listing_url);
        }

        if let Some(log_level) = lookup("QUIZ_EXTRACTOR_LOG_LEVEL") {
            self.output.log_level = log_level;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, config_str).map_err(|e| PipelineError::io(path, e))?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.captions
            .trigger
            .build()
            .map_err(PipelineError::Config)?;
        self.captions.stripper()?;

        if scraper::Selector::parse(&self.locator.link_selector).is_err() {
            return Err(PipelineError::Config(format!(
                "invalid link selector '{}'",
                self.locator.link_selector
            )));
        }

        if let Some(listing_url) = &self.locator.listing_url {
            url::Url::parse(listing_url).map_err(|e| {
                PipelineError::Config(format!("invalid listing URL '{}': {}", listing_url, e))
            })?;
        }

        if self.fetcher.command.trim().is_empty() {
            return Err(PipelineError::Config("fetcher command must not be empty".to_string()));
        }

        if self.fetcher.file_stem.trim().is_empty() {
            return Err(PipelineError::Config("fetcher file_stem must not be empty".to_string()));
        }

        if self.llm.model.trim().is_empty() {
            return Err(PipelineError::Config("llm model must not be empty".to_string()));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Quiz Extractor Configuration:\n\
            - Listing page: {}\n\
            - Downloader: {} (lang {})\n\
            - Trigger: {:?}\n\
            - Model: {:?} / {}\n\
            - Output Directory: {}",
            self.locator.listing_url.as_deref().unwrap_or("(none)"),
            self.fetcher.command,
            self.fetcher.subtitle_lang,
            self.captions.trigger,
            self.llm.provider,
            self.llm.model,
            self.output.base_dir.display(),
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerConfig) -> Self {
        self.config.captions.trigger = trigger;
        self
    }

    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.config.locator.listing_url = Some(url.into());
        self
    }

    pub fn with_fetcher_command(mut self, command: impl Into<String>) -> Self {
        self.config.fetcher.command = command.into();
        self
    }

    pub fn with_llm(mut self, llm: LLMConfig) -> Self {
        self.config.llm = llm;
        self
    }

    pub fn with_prompt_file(mut self, path: PathBuf) -> Self {
        self.config.prompt.prompt_file = Some(path);
        self
    }

    pub fn reuse_transcript(mut self, reuse: bool) -> Self {
        self.config.output.reuse_transcript = reuse;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
