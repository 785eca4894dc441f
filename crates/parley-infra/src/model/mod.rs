//! Local pretrained causal language model.
//!
//! A GPT-2 family model (GPT-2, DialoGPT, distilgpt2) loaded from a
//! HuggingFace-style directory and run on CPU with candle:
//!
//! - `config`: `config.json` hyperparameters
//! - `gpt2`: the transformer forward pass with a per-call key/value cache
//! - `generator`: `LocalCausalLm`, the `TextGenerator` implementation

pub mod config;
pub mod generator;
pub mod gpt2;

pub use generator::LocalCausalLm;
