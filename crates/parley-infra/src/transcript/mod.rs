//! Transcript adapters.

pub mod file;

pub use file::FileTranscript;
