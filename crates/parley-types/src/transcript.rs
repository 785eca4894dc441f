//! Transcript turn types.
//!
//! The transcript is an unstructured text file: one line per turn, speaker
//! implied by position (question, answer, question, ...). The speaker is
//! kept in memory only so logs can tell the two appends apart.

use std::fmt;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Bot => write!(f, "bot"),
        }
    }
}

/// A single question or answer destined for the transcript file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }

    /// The exact bytes appended to the transcript: the text with every line
    /// break (`\r\n`, `\n`, `\r`) replaced by a space, plus `\n`.
    pub fn to_line(&self) -> String {
        let mut line = self.text.replace("\r\n", " ").replace(['\n', '\r'], " ");
        line.push('\n');
        line
    }
}

/// Collapse a raw transcript into the single string fed to the tokenizer.
///
/// Every line is trimmed and the trimmed lines are concatenated with no
/// separator.
pub fn flatten_transcript(raw: &str) -> String {
    raw.lines().map(str::trim).collect()
}
