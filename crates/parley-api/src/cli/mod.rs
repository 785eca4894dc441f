//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. `serve` runs the REST API;
//! the other commands talk to the same chat service from the terminal.

pub mod ask;
pub mod chat;
pub mod history;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conversational chatbot backed by a local pretrained language model.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the configuration file.
    #[arg(long, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides `server.port`).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Send one sentence and print the reply.
    Ask {
        /// The user's sentence.
        sentence: String,
    },

    /// Start an interactive chat session.
    Chat,

    /// Print the conversation transcript.
    History,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["parley", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["parley", "ask", "hello there", "-vv", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Ask { ref sentence } if sentence == "hello there"));
    }

    #[test]
    fn test_ask_requires_sentence() {
        assert!(Cli::try_parse_from(["parley", "ask"]).is_err());
    }
}
