//! Main chat loop.
//!
//! Reads lines until EOF or `/exit`, dispatching slash commands and sending
//! everything else through the shared chat service.

use console::style;

use crate::state::AppState;

use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let service = &state.chat_service;

    println!();
    println!(
        "  {} {}",
        style("parley").cyan().bold(),
        style(format!("model: {}", service.model_name())).dim()
    );
    println!(
        "  {}",
        style("Type /help for commands, /exit to quit").dim()
    );
    println!();

    let (mut chat_input, _stdout) = ChatInput::new("You: ".to_string())?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof | InputEvent::Interrupted => {
                chat_input.flush();
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Reset => {
                            service.reset_context().await;
                            println!("  {}", style("Context cleared.").dim());
                        }
                        ChatCommand::History => {
                            let transcript = service.transcript().await?;
                            if transcript.is_empty() {
                                println!("  {}", style("No history yet.").dim());
                            }
                            for line in transcript.lines() {
                                println!("  {}", style(line).dim());
                            }
                        }
                        ChatCommand::Context => {
                            println!(
                                "  {} tokens in context",
                                style(service.context_len().await).cyan()
                            );
                        }
                        ChatCommand::Exit => {
                            chat_input.flush();
                            println!("  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "  {} Unknown command: {}. Type /help for commands.",
                                style("?").yellow().bold(),
                                name
                            );
                        }
                    }
                    continue;
                }

                match service.reply(&text).await {
                    Ok(reply) => println!("  {} {}", style("Bot:").cyan().bold(), reply),
                    Err(e) => {
                        tracing::error!(error = %e, "Reply failed");
                        eprintln!("  {} {e}", style("!").red().bold());
                    }
                }
            }
        }
    }

    Ok(())
}
