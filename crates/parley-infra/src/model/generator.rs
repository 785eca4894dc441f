//! `TextGenerator` backed by a local GPT-2 family model.
//!
//! Loads `config.json`, `tokenizer.json` and `model.safetensors` from one
//! directory and decodes greedily, so a reply depends only on its input.

use std::path::Path;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use parley_core::generation::TextGenerator;
use parley_types::error::GenerationError;
use parley_types::generation::GenerationParams;
use tokenizers::Tokenizer;

use super::config::Gpt2Config;
use super::gpt2::{Cache, Gpt2};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// GPT-2 end-of-text marker, used when `config.json` has no `eos_token_id`.
const EOS_TOKEN: &str = "<|endoftext|>";

/// A pretrained causal LM and its tokenizer, running on CPU.
pub struct LocalCausalLm {
    name: String,
    model: Gpt2,
    tokenizer: Tokenizer,
    eos_token_id: u32,
}

impl std::fmt::Debug for LocalCausalLm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCausalLm")
            .field("name", &self.name)
            .field("eos_token_id", &self.eos_token_id)
            .finish_non_exhaustive()
    }
}

impl LocalCausalLm {
    /// Load a model directory.
    ///
    /// This memory-maps the weights and builds every layer, so it is slow
    /// for large checkpoints; call it off the async runtime.
    pub fn load(model_dir: &Path) -> Result<Self, GenerationError> {
        let config = Gpt2Config::from_file(&model_dir.join(CONFIG_FILE))?;

        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            GenerationError::ModelLoad(format!("failed to load {}: {e}", tokenizer_path.display()))
        })?;

        let weights_path = model_dir.join(WEIGHTS_FILE);
        // SAFETY: the weights file is opened read-only and must not be
        // modified while the process runs.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &Device::Cpu)
        }
        .map_err(|e| {
            GenerationError::ModelLoad(format!("failed to map {}: {e}", weights_path.display()))
        })?;
        let model = Gpt2::load(vb, &config)
            .map_err(|e| GenerationError::ModelLoad(format!("failed to build model: {e}")))?;

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| model_dir.display().to_string());

        let generator = Self::from_parts(name, model, tokenizer)?;
        tracing::info!(
            model = %generator.name,
            layers = config.n_layer,
            embd = config.n_embd,
            positions = config.max_positions(),
            "Model loaded"
        );
        Ok(generator)
    }

    /// Assemble a generator from an already built model and tokenizer.
    pub fn from_parts(
        name: String,
        model: Gpt2,
        tokenizer: Tokenizer,
    ) -> Result<Self, GenerationError> {
        let eos_token_id = model
            .config()
            .eos_token_id
            .or_else(|| tokenizer.token_to_id(EOS_TOKEN))
            .ok_or_else(|| {
                GenerationError::ModelLoad(format!(
                    "no eos_token_id in config and no {EOS_TOKEN} in vocabulary"
                ))
            })?;

        Ok(Self {
            name,
            model,
            tokenizer,
            eos_token_id,
        })
    }
}

impl TextGenerator for LocalCausalLm {
    fn name(&self) -> &str {
        &self.name
    }

    fn eos_token_id(&self) -> u32 {
        self.eos_token_id
    }

    fn max_context_len(&self) -> usize {
        self.model.config().max_positions()
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, GenerationError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| GenerationError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, GenerationError> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| GenerationError::Tokenizer(e.to_string()))
    }

    fn generate(
        &self,
        input: &[u32],
        params: &GenerationParams,
    ) -> Result<Vec<u32>, GenerationError> {
        if input.is_empty() {
            return Err(GenerationError::EmptyInput);
        }

        let limit = params.length_limit(self.max_context_len());
        let mut output = input.to_vec();
        if output.len() >= limit {
            tracing::warn!(
                input_tokens = input.len(),
                limit,
                "Input already at the length limit, nothing generated"
            );
            return Ok(output);
        }

        let mut cache = Cache::new(self.model.config().n_layer);
        let mut logits = self.model.forward(&output, &mut cache).map_err(inference)?;
        loop {
            let generated = output.len() - input.len();
            let suppress = (generated < params.min_new_tokens).then_some(self.eos_token_id);
            let scores: Vec<f32> = logits.to_vec1().map_err(inference)?;
            let next = greedy_token(&scores, suppress)
                .ok_or_else(|| GenerationError::Inference("empty logits".to_string()))?;

            output.push(next);
            if next == self.eos_token_id || output.len() >= limit {
                break;
            }
            logits = self.model.forward(&[next], &mut cache).map_err(inference)?;
        }

        tracing::debug!(
            input_tokens = input.len(),
            new_tokens = output.len() - input.len(),
            "Generation finished"
        );
        Ok(output)
    }
}

fn inference(err: candle_core::Error) -> GenerationError {
    GenerationError::Inference(err.to_string())
}

/// Index of the highest score, skipping `suppress`. Ties go to the lowest
/// index; NaN scores never win.
fn greedy_token(scores: &[f32], suppress: Option<u32>) -> Option<u32> {
    scores
        .iter()
        .enumerate()
        .filter(|&(i, score)| Some(i as u32) != suppress && !score.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((i, score)),
        })
        .map(|(i, _)| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use candle_nn::VarMap;
    use tempfile::TempDir;

    use crate::model::gpt2::tests::tiny_config;

    /// Word-level tokenizer: id 0 is `<|endoftext|>`, ids 1..=10 are words,
    /// id 11 is `<unk>`.
    const TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": 0, "content": "<|endoftext|>", "single_word": false, "lstrip": false,
             "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {
                "<|endoftext|>": 0, "hello": 1, "how": 2, "are": 3, "you": 4,
                "fine": 5, "thanks": 6, "good": 7, "bye": 8, "yes": 9, "no": 10,
                "<unk>": 11
            },
            "unk_token": "<unk>"
        }
    }"#;

    fn tiny_generator() -> (VarMap, LocalCausalLm) {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = Gpt2::load(vb, &tiny_config(12)).unwrap();
        let tokenizer = Tokenizer::from_str(TOKENIZER_JSON).unwrap();
        let generator = LocalCausalLm::from_parts("tiny".to_string(), model, tokenizer).unwrap();
        (varmap, generator)
    }

    #[test]
    fn test_encode_decode_words() {
        let (_varmap, generator) = tiny_generator();
        let ids = generator.encode("hello how are you").unwrap();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(generator.decode(&[1, 0, 5, 6]).unwrap(), "hello fine thanks");
    }

    #[test]
    fn test_encode_turn_appends_eos() {
        let (_varmap, generator) = tiny_generator();
        assert_eq!(generator.encode_turn("hello").unwrap(), vec![1, 0]);
        assert_eq!(generator.encode_turn("").unwrap(), vec![0]);
    }

    #[test]
    fn test_generate_extends_input_within_limit() {
        let (_varmap, generator) = tiny_generator();
        let input = vec![1, 2, 3, 4, 0];
        let params = GenerationParams {
            max_length: 12,
            ..GenerationParams::default()
        };

        let output = generator.generate(&input, &params).unwrap();
        assert_eq!(&output[..input.len()], input.as_slice());
        assert!(output.len() > input.len());
        assert!(output.len() <= 12);
        // min_new_tokens = 1: the first new token is never end-of-sequence
        assert_ne!(output[input.len()], 0);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let (_varmap, generator) = tiny_generator();
        let params = GenerationParams::default();
        let a = generator.generate(&[1, 0], &params).unwrap();
        let b = generator.generate(&[1, 0], &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_clamps_to_model_positions() {
        let (_varmap, generator) = tiny_generator();
        let params = GenerationParams {
            min_new_tokens: 100,
            ..GenerationParams::default()
        };
        let output = generator.generate(&[1, 0], &params).unwrap();
        assert_eq!(output.len(), 32);
    }

    #[test]
    fn test_generate_input_at_limit_is_returned_unchanged() {
        let (_varmap, generator) = tiny_generator();
        let params = GenerationParams {
            max_length: 3,
            ..GenerationParams::default()
        };
        let output = generator.generate(&[1, 2, 3, 0], &params).unwrap();
        assert_eq!(output, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_generate_rejects_empty_input() {
        let (_varmap, generator) = tiny_generator();
        let err = generator
            .generate(&[], &GenerationParams::default())
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyInput));
    }

    #[test]
    fn test_load_from_directory() {
        let tmp = TempDir::new().unwrap();
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        Gpt2::load(vb, &tiny_config(12)).unwrap();
        varmap.save(tmp.path().join(WEIGHTS_FILE)).unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            serde_json::to_string(&tiny_config(12)).unwrap(),
        )
        .unwrap();
        std::fs::write(tmp.path().join(TOKENIZER_FILE), TOKENIZER_JSON).unwrap();

        let generator = LocalCausalLm::load(tmp.path()).unwrap();
        assert_eq!(generator.eos_token_id(), 0);
        assert_eq!(generator.max_context_len(), 32);
        let output = generator
            .generate(&[1, 0], &GenerationParams::default())
            .unwrap();
        assert!(output.len() > 2);
    }

    #[test]
    fn test_load_missing_directory() {
        let err = LocalCausalLm::load(Path::new("/nonexistent/model")).unwrap_err();
        assert!(matches!(err, GenerationError::ModelLoad(_)));
    }

    #[test]
    fn test_greedy_token() {
        assert_eq!(greedy_token(&[0.1, 0.9, 0.5], None), Some(1));
        assert_eq!(greedy_token(&[0.1, 0.9, 0.5], Some(1)), Some(2));
        assert_eq!(greedy_token(&[0.7, 0.7], None), Some(0));
        assert_eq!(greedy_token(&[f32::NAN, 0.2], None), Some(1));
        assert_eq!(greedy_token(&[], None), None);
    }
}
