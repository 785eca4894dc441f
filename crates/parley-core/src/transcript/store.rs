//! TranscriptStore trait definition.
//!
//! Defined in parley-core so the chat service can persist turns without
//! depending on any specific storage. The file-backed adapter lives in
//! parley-infra.

use parley_types::error::TranscriptError;
use parley_types::transcript::Turn;

/// Append-only store for conversation turns.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations need no internal locking: `ChatService` only touches the
/// store while it holds its exchange lock.
pub trait TranscriptStore: Send + Sync {
    /// Read the whole transcript as raw text. A store that was never written
    /// reads as the empty string.
    fn read_all(&self) -> impl std::future::Future<Output = Result<String, TranscriptError>> + Send;

    /// Append one turn at the end of the transcript.
    fn append(
        &self,
        turn: &Turn,
    ) -> impl std::future::Future<Output = Result<(), TranscriptError>> + Send;
}
