/// Stage-numbered output folders for one episode

use crate::error::{PipelineError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pipeline stages that persist an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Captions,
    Transcript,
    Prompt,
    Response,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Captions,
        Stage::Transcript,
        Stage::Prompt,
        Stage::Response,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Stage::Captions => 1,
            Stage::Transcript => 2,
            Stage::Prompt => 3,
            Stage::Response => 4,
        }
    }

    /// Folder name, e.g. `02_transcript`
    pub fn folder_name(&self) -> String {
        let name = match self {
            Stage::Captions => "captions",
            Stage::Transcript => "transcript",
            Stage::Prompt => "prompt",
            Stage::Response => "response",
        };
        format!("{:02}_{}", self.number(), name)
    }
}

/// Writes each stage's output under `<base_dir>/<episode-slug>/<NN_stage>/`
#[derive(Debug, Clone)]
pub struct ResultWriter {
    root: PathBuf,
}

impl ResultWriter {
    pub fn new(base_dir: &Path, episode_url: &str) -> Self {
        Self {
            root: base_dir.join(episode_slug(episode_url)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.folder_name())
    }

    pub fn artifact_path(&self, stage: Stage, file_name: &str) -> PathBuf {
        self.stage_dir(stage).join(file_name)
    }

    /// Create the stage folder if needed
    pub async fn ensure_stage(&self, stage: Stage) -> Result<PathBuf> {
        let dir = self.stage_dir(stage);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::io(&dir, e))?;
        Ok(dir)
    }

    pub async fn write_text(&self, stage: Stage, file_name: &str, contents: &str) -> Result<PathBuf> {
        self.ensure_stage(stage).await?;
        let path = self.artifact_path(stage, file_name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;
        debug!("Wrote {} ({} bytes)", path.display(), contents.len());
        Ok(path)
    }

    pub async fn write_json<T: Serialize>(&self, stage: Stage, file_name: &str, value: &T) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| PipelineError::Config(format!("cannot serialize {}: {}", file_name, e)))?;
        self.write_text(stage, file_name, &json).await
    }

    /// Contents of an artifact written by an earlier run, if present
    pub async fn read_existing(&self, stage: Stage, file_name: &str) -> Result<Option<String>> {
        let path = self.artifact_path(stage, file_name);
        if !path.exists() {
            return Ok(None);
        }
        tokio::fs::read_to_string(&path)
            .await
            .map(Some)
            .map_err(|e| PipelineError::io(&path, e))
    }
}

/// Folder-safe name for an episode: the last non-empty path segment of its
/// URL with anything outside `[A-Za-z0-9_-]` replaced by `_`
pub fn episode_slug(episode_url: &str) -> String {
    let segment = url::Url::parse(episode_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_default();

    let stem = segment
        .rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or(segment);

    let slug: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if slug.trim_matches('_').is_empty() {
        "episode".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_names() {
        let names: Vec<String> = Stage::ALL.iter().map(Stage::folder_name).collect();
        assert_eq!(
            names,
            vec!["01_captions", "02_transcript", "03_prompt", "04_response"]
        );
    }

    #[test]
    fn test_episode_slug() {
        assert_eq!(
            episode_slug("https://www.example.tv/france-3/questions/episode-1234.html"),
            "episode-1234"
        );
        assert_eq!(episode_slug("https://www.example.tv/replay/abc%20def/"), "abc_20def");
        assert_eq!(episode_slug("https://www.example.tv/"), "episode");
        assert_eq!(episode_slug("not a url"), "episode");
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path(), "https://example.tv/ep-7");

        assert_eq!(writer.read_existing(Stage::Transcript, "transcript.txt").await.unwrap(), None);

        let path = writer
            .write_text(Stage::Transcript, "transcript.txt", "Bonsoir ")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("ep-7/02_transcript/transcript.txt"));
        assert_eq!(
            writer.read_existing(Stage::Transcript, "transcript.txt").await.unwrap(),
            Some("Bonsoir ".to_string())
        );
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path(), "https://example.tv/ep-7");
        let path = writer
            .write_json(Stage::Response, "response.json", &serde_json::json!({ "tokens": 3 }))
            .await
            .unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"tokens\": 3"));
    }
}
