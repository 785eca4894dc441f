//! Transcript persistence port.

pub mod store;

pub use store::TranscriptStore;
