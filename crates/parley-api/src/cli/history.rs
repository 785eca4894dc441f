//! `parley history` command.
//!
//! Reads the transcript file directly, so it works without loading the model.

use console::style;

use parley_core::transcript::TranscriptStore;
use parley_infra::transcript::FileTranscript;
use parley_types::config::AppConfig;

/// Print the transcript, numbering each turn.
pub async fn show_history(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let transcript = FileTranscript::new(&config.history_path);
    let text = transcript.read_all().await?;
    let turns: Vec<&str> = text.lines().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!(
            "  {} {}",
            style("No history yet in").dim(),
            style(config.history_path.display()).dim()
        );
        return Ok(());
    }

    for (i, turn) in turns.iter().enumerate() {
        println!("  {:>4}  {}", style(i + 1).dim(), turn);
    }
    Ok(())
}
