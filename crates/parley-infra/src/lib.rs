//! Infrastructure layer for Parley.
//!
//! Contains implementations of the port traits defined in `parley-core`:
//! the local GPT-2 family text generator (candle + tokenizers), the
//! file-backed transcript, and the TOML configuration loader.

pub mod config;
pub mod model;
pub mod transcript;
