use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use quiz_extractor::captions::format_speaker_turns;
use quiz_extractor::{CaptionWindowExtractor, Config, TriggerConfig};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the transcript
    tracing_subscriber::fmt()
        .with_env_filter("quiz_extractor=info,extract_transcript=info")
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("extract-transcript")
        .about("Print the final-round transcript of a local caption file")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("WebVTT caption file")
                .required(true),
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
            Arg::new("turns")
                .long("turns")
                .help("Print one speaker turn per line")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("caption file required"))?;

    let mut config = Config::load(None)?;
    if let Some(trigger) = matches
        .get_one::<String>("trigger")
        .and_then(|kind| TriggerConfig::from_kind(kind))
    {
        config.captions.trigger = trigger;
    }

    let extractor = CaptionWindowExtractor::from_config(&config.captions)?;
    info!("🔍 Scanning {} with the {} trigger", path.display(), extractor.policy_name());

    let transcript = extractor.extract_file(&path).await?;
    if matches.get_flag("turns") {
        println!("{}", format_speaker_turns(&transcript));
    } else {
        println!("{}", transcript);
    }

    Ok(())
}
