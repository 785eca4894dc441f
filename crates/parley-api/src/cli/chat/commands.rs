//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Forget the running context (the transcript is kept).
    Reset,
    /// Print the transcript.
    History,
    /// Show the running context size.
    Context,
    /// Exit the chat session.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/reset" | "/new" => Some(ChatCommand::Reset),
        "/history" => Some(ChatCommand::History),
        "/context" | "/ctx" => Some(ChatCommand::Context),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     {}", style("/help").cyan(), "Show this help message");
    println!("  {}    {}", style("/reset").cyan(), "Forget the conversation so far");
    println!("  {}  {}", style("/history").cyan(), "Show the transcript");
    println!("  {}  {}", style("/context").cyan(), "Show the running context size");
    println!("  {}     {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!("  {}", style("Ctrl+D or Ctrl+C to exit").dim());
    println!();
}
