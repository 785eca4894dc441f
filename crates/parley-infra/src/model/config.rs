//! GPT-2 `config.json` hyperparameters.

use std::path::Path;

use parley_types::error::GenerationError;
use serde::{Deserialize, Serialize};

/// The subset of a HuggingFace GPT-2 config the forward pass needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gpt2Config {
    pub vocab_size: usize,
    pub n_embd: usize,
    pub n_head: usize,
    pub n_layer: usize,
    #[serde(default)]
    pub n_positions: Option<usize>,
    #[serde(default)]
    pub n_ctx: Option<usize>,
    #[serde(default = "default_layer_norm_epsilon")]
    pub layer_norm_epsilon: f64,
    #[serde(default)]
    pub eos_token_id: Option<u32>,
}

fn default_layer_norm_epsilon() -> f64 {
    1e-5
}

impl Gpt2Config {
    /// Read and validate `config.json`.
    pub fn from_file(path: &Path) -> Result<Self, GenerationError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::ModelLoad(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            GenerationError::ModelLoad(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Positional limit. Older configs only carry `n_ctx`.
    pub fn max_positions(&self) -> usize {
        self.n_positions.or(self.n_ctx).unwrap_or(1024)
    }

    pub fn head_dim(&self) -> usize {
        self.n_embd / self.n_head
    }

    fn validate(&self) -> Result<(), GenerationError> {
        if self.n_head == 0 || self.n_embd % self.n_head != 0 {
            return Err(GenerationError::ModelLoad(format!(
                "n_embd ({}) is not divisible by n_head ({})",
                self.n_embd, self.n_head
            )));
        }
        if self.max_positions() == 0 || self.vocab_size == 0 {
            return Err(GenerationError::ModelLoad(
                "n_positions and vocab_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIALOGPT_LARGE: &str = r#"{
        "activation_function": "gelu_new",
        "architectures": ["GPT2LMHeadModel"],
        "bos_token_id": 50256,
        "eos_token_id": 50256,
        "layer_norm_epsilon": 1e-05,
        "model_type": "gpt2",
        "n_ctx": 1024,
        "n_embd": 1280,
        "n_head": 20,
        "n_layer": 36,
        "n_positions": 1024,
        "vocab_size": 50257
    }"#;

    #[test]
    fn test_parse_hf_config() {
        let config: Gpt2Config = serde_json::from_str(DIALOGPT_LARGE).unwrap();
        assert_eq!(config.max_positions(), 1024);
        assert_eq!(config.n_layer, 36);
        assert_eq!(config.head_dim(), 64);
        assert_eq!(config.eos_token_id, Some(50256));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_uneven_heads() {
        let config = Gpt2Config {
            vocab_size: 10,
            n_embd: 10,
            n_head: 3,
            n_layer: 1,
            n_positions: Some(8),
            n_ctx: None,
            layer_norm_epsilon: 1e-5,
            eos_token_id: None,
        };
        assert!(matches!(config.validate(), Err(GenerationError::ModelLoad(_))));
    }

    #[test]
    fn test_max_positions_falls_back_to_n_ctx() {
        let config: Gpt2Config = serde_json::from_str(
            r#"{"vocab_size": 8, "n_embd": 4, "n_head": 2, "n_layer": 1, "n_ctx": 256}"#,
        )
        .unwrap();
        assert_eq!(config.max_positions(), 256);
        assert_eq!(config.eos_token_id, None);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Gpt2Config::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
