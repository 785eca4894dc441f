//! TextGenerator trait definition.
//!
//! This is the seam between the chat service and the pretrained model. The
//! trait is synchronous and object-safe: generation is CPU-bound, so callers
//! move it onto the blocking pool themselves and hold the generator behind
//! an `Arc<dyn TextGenerator>`.

use std::sync::Arc;

use parley_types::error::GenerationError;
use parley_types::generation::GenerationParams;

/// A pretrained causal language model plus its tokenizer.
///
/// Implementations live in parley-infra (e.g., `LocalCausalLm`).
pub trait TextGenerator: Send + Sync {
    /// Model identifier used in logs.
    fn name(&self) -> &str;

    /// End-of-sequence token id. Also used as the pad token.
    fn eos_token_id(&self) -> u32;

    /// Number of positions the model can attend over.
    fn max_context_len(&self) -> usize;

    /// Tokenize `text` without adding special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>, GenerationError>;

    /// Detokenize `ids`, dropping special tokens.
    fn decode(&self, ids: &[u32]) -> Result<String, GenerationError>;

    /// Extend `input` with a model-predicted continuation.
    ///
    /// The returned sequence starts with `input` unchanged. Decoding is
    /// greedy, so the result is a pure function of `input` and `params`.
    /// Generation stops at end-of-sequence (which is included) or when the
    /// sequence reaches `params.length_limit(self.max_context_len())`.
    fn generate(
        &self,
        input: &[u32],
        params: &GenerationParams,
    ) -> Result<Vec<u32>, GenerationError>;

    /// Tokenize `text` and terminate it with the end-of-sequence token.
    ///
    /// This is the unit the running context is built from: one turn, one
    /// trailing end-of-sequence.
    fn encode_turn(&self, text: &str) -> Result<Vec<u32>, GenerationError> {
        let mut ids = self.encode(text)?;
        ids.push(self.eos_token_id());
        Ok(ids)
    }
}

/// Shared, type-erased generator handle.
pub type SharedGenerator = Arc<dyn TextGenerator>;
