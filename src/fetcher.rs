use crate::config::FetcherConfig;
use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};

/// Downloads an episode's caption track with an external downloader
#[derive(Debug, Clone)]
pub struct CaptionFetcher {
    config: FetcherConfig,
    force: bool,
}

/// Caption file on disk and whether this run downloaded it
#[derive(Debug, Clone)]
pub struct FetchedCaptions {
    pub path: PathBuf,
    pub downloaded: bool,
}

impl CaptionFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self {
            config,
            force: false,
        }
    }

    /// Always download, replacing any caption file already on disk
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Deterministic path of the caption file inside `output_dir`
    pub fn caption_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!(
            "{}.{}.vtt",
            self.config.file_stem, self.config.subtitle_lang
        ))
    }

    /// Downloader arguments for `url`, writing into `output_dir`
    pub fn command_args(&self, url: &str, output_dir: &Path) -> Vec<String> {
        let template = output_dir.join(format!("{}.%(ext)s", self.config.file_stem));

        let mut args = vec![
            "--skip-download".to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-langs".to_string(),
            self.config.subtitle_lang.clone(),
            "--sub-format".to_string(),
            "vtt".to_string(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
        ];
        if self.force {
            args.push("--force-overwrites".to_string());
        }
        args.extend(self.config.extra_args.iter().cloned());
        args.push(url.to_string());
        args
    }

    /// Fetch the captions for `url` unless they are already on disk
    pub async fn fetch(&self, url: &str, output_dir: &Path) -> Result<FetchedCaptions> {
        let path = self.caption_path(output_dir);

        if !self.force && self.config.skip_existing && path.exists() {
            info!("📁 Captions already downloaded: {}", path.display());
            return Ok(FetchedCaptions {
                path,
                downloaded: false,
            });
        }

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| PipelineError::io(output_dir, e))?;

        if self.force && path.exists() {
            debug!("Removing stale captions: {}", path.display());
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| PipelineError::io(&path, e))?;
        }

        info!("⬇️ Downloading captions for {}", url);
        let args = self.command_args(url, output_dir);
        debug!("Running {} {}", self.config.command, args.join(" "));

        let output = tokio::process::Command::new(&self.config.command)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.tool_error(format!("cannot run: {}", e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Some(line) = stderr.lines().find(|line| line.starts_with("ERROR")) {
            return Err(self.tool_error(line.trim().to_string()));
        }

        if !output.status.success() {
            return Err(self.tool_error(format!("exited with {}", output.status)));
        }

        for line in stderr.lines().filter(|line| line.starts_with("WARNING")) {
            warn!("{}: {}", self.config.command, line);
        }

        if !path.exists() {
            return Err(self.tool_error(format!(
                "no {} captions produced at {}",
                self.config.subtitle_lang,
                path.display()
            )));
        }

        info!("✅ Captions saved: {}", path.display());
        Ok(FetchedCaptions {
            path,
            downloaded: true,
        })
    }

    fn tool_error(&self, message: String) -> PipelineError {
        PipelineError::ExternalTool {
            tool: self.config.command.clone(),
            message,
        }
    }
}
