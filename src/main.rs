use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

use quiz_extractor::{Config, Pipeline, PipelineError, RunOptions, TriggerConfig};

fn cli() -> Command {
    Command::new("Quiz Extractor")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Extracts final-round quiz questions from game show captions")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("Episode page URL (omit to use the latest episode from the listing page)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for results"),
        )
        .arg(
            Arg::new("trigger")
                .short('t')
                .long("trigger")
                .value_name("KIND")
                .value_parser(["fixed", "multi", "marker"])
                .help("Rule that opens the final-round window"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Download and parse again even if files exist")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("transcript-only")
                .long("transcript-only")
                .help("Stop after writing the transcript")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
}

fn init_logging(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    tracing_subscriber::fmt()
        .with_env_filter(format!("quiz_extractor={},extract_transcript={},warn", level, level))
        .init();
}

fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.output.base_dir = PathBuf::from(dir);
    }

    if let Some(trigger) = matches
        .get_one::<String>("trigger")
        .and_then(|kind| TriggerConfig::from_kind(kind))
    {
        config.captions.trigger = trigger;
    }
}

async fn run(matches: &ArgMatches, config: Config) -> Result<(), PipelineError> {
    let options = RunOptions {
        force: matches.get_flag("force"),
        transcript_only: matches.get_flag("transcript-only"),
    };
    let url = matches.get_one::<String>("url").map(String::as_str);

    let pipeline = Pipeline::new(config).await?;
    let report = pipeline.run(url, options).await?;

    info!("✅ Transcript: {}", report.transcript_path.display());
    if let Some(path) = &report.response_path {
        info!("✅ Questions: {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);

    let loaded = Config::load(config_path.as_deref());
    let log_level = loaded
        .as_ref()
        .map(|config| config.output.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&log_level, matches.get_flag("verbose"));

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    apply_overrides(&mut config, &matches);
    debug!("{}", config.summary());

    match run(&matches, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_overrides() {
        let matches = cli().get_matches_from([
            "quiz-extractor",
            "https://example.tv/ep",
            "--trigger",
            "multi",
            "-o",
            "/tmp/out",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &matches);

        assert_eq!(config.captions.trigger, TriggerConfig::default_multi());
        assert_eq!(config.output.base_dir, PathBuf::from("/tmp/out"));
        assert_eq!(
            matches.get_one::<String>("url").map(String::as_str),
            Some("https://example.tv/ep")
        );
    }
}
