//! Generation parameters for the local causal language model.

use serde::{Deserialize, Serialize};

/// Knobs passed to every generation call.
///
/// Loaded from the `[generation]` table of `parley.toml`. All fields have
/// defaults, so an empty table (or no table at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Cap on the total sequence length (input + continuation), in tokens.
    ///
    /// Generators clamp this further to their positional limit.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Minimum number of tokens generated before end-of-sequence may win.
    #[serde(default = "default_min_new_tokens")]
    pub min_new_tokens: usize,

    /// Positions kept free for the reply when the model input is trimmed
    /// to fit the context window.
    #[serde(default = "default_reply_reserve")]
    pub reply_reserve: usize,
}

fn default_max_length() -> usize {
    2000
}

fn default_min_new_tokens() -> usize {
    1
}

fn default_reply_reserve() -> usize {
    64
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            min_new_tokens: default_min_new_tokens(),
            reply_reserve: default_reply_reserve(),
        }
    }
}

impl GenerationParams {
    /// Effective total-length cap for a model with `context_len` positions.
    pub fn length_limit(&self, context_len: usize) -> usize {
        self.max_length.min(context_len)
    }
}
