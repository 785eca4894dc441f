//! Text generation abstractions.
//!
//! - `TextGenerator`: object-safe trait for a pretrained causal LM
//! - `SharedGenerator`: the `Arc<dyn TextGenerator>` handle services hold

pub mod generator;

pub use generator::{SharedGenerator, TextGenerator};
